//! Delivery of notices to a server's log destination.

use crate::gateway::ModerationGateway;
use bastion_core::{Notice, Snowflake};
use tracing::{debug, warn};

/// `<@id> \`id\`` as used throughout notice bodies.
pub fn tag(id: &Snowflake) -> String {
    format!("<@{id}> `{id}`")
}

/// Post `notice` to the log destination of `guild`.
///
/// A server without a destination is skipped. Delivery failures are logged
/// and dropped so they never interrupt enforcement.
pub(crate) async fn post(gateway: &dyn ModerationGateway, guild: &Snowflake, notice: Notice) {
    let Some(channel) = gateway.log_channel(guild).await else {
        debug!(guild = %guild, title = %notice.title(), "No log destination, notice dropped");
        return;
    };
    if let Err(e) = gateway.send_notice(&channel, &notice).await {
        warn!(guild = %guild, channel = %channel, error = %e, "Failed to deliver notice");
    }
}
