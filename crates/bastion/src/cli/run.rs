//! Run the agent.

use bastion::BastionConfig;
use bastion_discord::BastionBot;
use bastion_error::BastionResult;
use tracing::info;

/// Connect to Discord with `token` and enforce until the connection closes.
pub async fn run_bot(config: &BastionConfig, token: &str) -> BastionResult<()> {
    let layout = config.prepare_layout().await?;
    info!(data_dir = %layout.data_dir().display(), "Starting Bastion");

    let mut bot = BastionBot::new(
        token,
        layout,
        config.engine_settings()?,
        config.log_channel()?,
    )
    .await?;
    bot.start().await
}
