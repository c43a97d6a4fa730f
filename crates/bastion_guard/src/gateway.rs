//! The chat platform as seen by the enforcement engine.
//!
//! The engine never talks to the platform directly. Everything it reads
//! (audit trail, membership, roles) and everything it does (ban, unban, kick,
//! role edits, notices) goes through [`ModerationGateway`], which the Discord
//! adapter implements over serenity and tests implement in memory.

use async_trait::async_trait;
use bastion_core::{Notice, RoleState, Snowflake};
use bastion_error::GatewayError;
use chrono::{DateTime, Utc};
use derive_getters::Getters;

/// Result type for platform operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Audit trail entry types the engine queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum AuditKind {
    /// A member was banned.
    BanAdd,
    /// A member was kicked.
    MemberKick,
    /// A bot account was added.
    BotAdd,
    /// A channel was deleted.
    ChannelDelete,
    /// A role was deleted.
    RoleDelete,
    /// A role was edited.
    RoleUpdate,
}

/// One audit trail entry, reduced to what attribution needs.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct AuditEntry {
    target: Option<Snowflake>,
    executor: Option<Snowflake>,
    created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Create an entry.
    pub fn new(
        target: Option<Snowflake>,
        executor: Option<Snowflake>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            target,
            executor,
            created_at,
        }
    }
}

/// A server the agent is present in.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GuildSummary {
    id: Snowflake,
    owner: Snowflake,
}

impl GuildSummary {
    /// Create a guild summary.
    pub fn new(id: Snowflake, owner: Snowflake) -> Self {
        Self { id, owner }
    }
}

/// Permissions the agent itself holds in a server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnCapabilities {
    /// May read the audit trail.
    pub view_audit_log: bool,
    /// May ban and unban.
    pub ban_members: bool,
    /// May kick.
    pub kick_members: bool,
    /// May edit roles.
    pub manage_roles: bool,
}

impl OwnCapabilities {
    /// Every capability granted.
    pub fn all() -> Self {
        Self {
            view_audit_log: true,
            ban_members: true,
            kick_members: true,
            manage_roles: true,
        }
    }
}

/// Operations the engine needs from the chat platform.
///
/// Implementations should map platform failures onto
/// [`bastion_error::GatewayErrorKind`] so callers can tell a missing member
/// (`NotFound`) from a privilege problem (`MissingCapability`).
#[async_trait]
pub trait ModerationGateway: Send + Sync {
    /// The agent's own member identifier.
    fn operator_id(&self) -> Snowflake;

    /// Every server the agent is present in.
    async fn guilds(&self) -> GatewayResult<Vec<GuildSummary>>;

    /// The owner of `guild`.
    async fn guild_owner(&self, guild: &Snowflake) -> GatewayResult<Snowflake>;

    /// Most recent audit entries of `kind`, newest first.
    async fn audit_entries(
        &self,
        guild: &Snowflake,
        kind: AuditKind,
        limit: u8,
    ) -> GatewayResult<Vec<AuditEntry>>;

    /// Permissions the agent holds in `guild`.
    async fn own_capabilities(&self, guild: &Snowflake) -> GatewayResult<OwnCapabilities>;

    /// Whether `user` is currently a member of `guild`.
    ///
    /// Implementations consult any local cache first and fall back to a
    /// direct lookup.
    async fn is_member(&self, guild: &Snowflake, user: &Snowflake) -> GatewayResult<bool>;

    /// Ban `user` from `guild`.
    async fn ban(&self, guild: &Snowflake, user: &Snowflake, reason: &str) -> GatewayResult<()>;

    /// Lift the ban on `user` in `guild`.
    async fn unban(&self, guild: &Snowflake, user: &Snowflake, reason: &str)
    -> GatewayResult<()>;

    /// Kick `user` from `guild`.
    async fn kick(&self, guild: &Snowflake, user: &Snowflake, reason: &str) -> GatewayResult<()>;

    /// Every role in `guild`.
    async fn roles(&self, guild: &Snowflake) -> GatewayResult<Vec<RoleState>>;

    /// Overwrite a role's permission bitmask.
    async fn set_role_permissions(
        &self,
        guild: &Snowflake,
        role: &Snowflake,
        permissions: u64,
        reason: &str,
    ) -> GatewayResult<()>;

    /// Move a role to `position`.
    async fn set_role_position(
        &self,
        guild: &Snowflake,
        role: &Snowflake,
        position: u16,
        reason: &str,
    ) -> GatewayResult<()>;

    /// Where notices for `guild` go, if anywhere.
    async fn log_channel(&self, guild: &Snowflake) -> Option<Snowflake>;

    /// Post a notice to `channel`.
    async fn send_notice(&self, channel: &Snowflake, notice: &Notice) -> GatewayResult<()>;

    /// Send a plain direct message to `user`.
    async fn direct_message(&self, user: &Snowflake, text: &str) -> GatewayResult<()>;
}
