//! Offline feature flag editing.

use super::commands::FeatureCommands;
use bastion::BastionConfig;
use bastion_core::Capability;
use bastion_error::BastionResult;
use bastion_store::FeatureRegistry;

/// Handle `bastion features ...`.
pub async fn handle_features_command(
    command: FeatureCommands,
    config: &BastionConfig,
) -> BastionResult<()> {
    let layout = config.layout()?;
    let registry = FeatureRegistry::open(layout.features_path()).await?;

    match command {
        FeatureCommands::List => {}
        FeatureCommands::Enable { names } => toggle(&registry, &names, true).await?,
        FeatureCommands::Disable { names } => toggle(&registry, &names, false).await?,
    }

    println!("{}", registry.snapshot().pretty());
    Ok(())
}

async fn toggle(registry: &FeatureRegistry, names: &[String], enabled: bool) -> BastionResult<()> {
    let mut known = Vec::new();
    for name in names.iter().flat_map(|n| n.split(',')).map(str::trim) {
        if name.is_empty() {
            continue;
        }
        match Capability::normalize(name) {
            Some(capability) if !known.contains(&capability) => known.push(capability),
            Some(_) => {}
            None => eprintln!("Unknown feature: {}", name),
        }
    }

    registry.set_many(&known, enabled).await?;
    println!("Updated {} feature(s).", known.len());
    Ok(())
}
