//! Offline identifier set editing.

use super::commands::ListCommands;
use bastion::BastionConfig;
use bastion_core::Snowflake;
use bastion_error::BastionResult;
use bastion_store::IdentifierStore;

/// Handle `bastion list ...`.
pub async fn handle_list_command(
    command: ListCommands,
    config: &BastionConfig,
) -> BastionResult<()> {
    let store = IdentifierStore::new(config.layout()?);

    match command {
        ListCommands::View { set } => {
            let ids = store.load(set).await?;
            if ids.is_empty() {
                println!("The {} is currently empty.", set);
            } else {
                println!("{} ({}):", set, ids.len());
                for id in ids.iter() {
                    println!("{}", id);
                }
            }
        }

        ListCommands::Add { set, ids } => {
            let ids = normalize(&ids);
            let updated = store.add(set, &ids).await?;
            println!("{} now holds {} identifier(s).", set, updated.len());
        }

        ListCommands::Remove { set, ids } => {
            let ids = normalize(&ids);
            let updated = store.remove(set, &ids).await?;
            println!("{} now holds {} identifier(s).", set, updated.len());
        }
    }

    Ok(())
}

/// Accept raw identifiers and `<@id>` mentions, reporting anything else.
fn normalize(raw: &[String]) -> Vec<String> {
    raw.iter()
        .filter_map(|value| match Snowflake::from_mention(value) {
            Some(id) => Some(id.as_str().to_string()),
            None => {
                eprintln!("Skipping invalid identifier: {}", value);
                None
            }
        })
        .collect()
}
