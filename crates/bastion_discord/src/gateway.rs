//! [`ModerationGateway`] over serenity's HTTP client.

use crate::conversions::{
    audit_action, capabilities_from, gateway_error, platform_id, role_state, to_utc,
};
use async_trait::async_trait;
use bastion_core::{Notice, RoleState, Snowflake};
use bastion_error::GatewayErrorKind;
use bastion_guard::{
    AuditEntry, AuditKind, GatewayResult, GuildSummary, ModerationGateway, OwnCapabilities,
};
use parking_lot::RwLock;
use serenity::builder::{CreateEmbed, CreateMessage, EditRole};
use serenity::http::Http;
use serenity::model::Timestamp;
use serenity::model::guild::Guild;
use serenity::model::id::{ChannelId, GuildId, RoleId, UserId};
use serenity::model::permissions::Permissions;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Discord access for the enforcement engine.
///
/// Keeps a small cache of known guild owners and member presence, filled
/// from gateway events, so the deny-list sweep does not need an HTTP call
/// for every identifier it already knows about.
pub struct SerenityGateway {
    http: Arc<Http>,
    operator: Snowflake,
    log_channel: Option<Snowflake>,
    owners: RwLock<HashMap<Snowflake, Snowflake>>,
    presence: RwLock<HashMap<Snowflake, HashSet<Snowflake>>>,
}

impl SerenityGateway {
    /// Connect with `token` and look up the agent's own identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected.
    #[instrument(skip(token), fields(token_len = token.len()))]
    pub async fn connect(token: &str, log_channel: Option<Snowflake>) -> GatewayResult<Self> {
        let http = Arc::new(Http::new(token));
        let me = http
            .get_current_user()
            .await
            .map_err(|e| gateway_error("Failed to fetch current user", e))?;
        debug!(operator = %me.id, "Resolved agent identity");
        Ok(Self {
            http,
            operator: Snowflake::from_u64(me.id.get()),
            log_channel,
            owners: RwLock::new(HashMap::new()),
            presence: RwLock::new(HashMap::new()),
        })
    }

    /// The HTTP client in use.
    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }

    /// Record a guild's owner and the members delivered with it.
    pub fn track_guild(&self, guild: &Guild) {
        let id = Snowflake::from_u64(guild.id.get());
        self.owners
            .write()
            .insert(id.clone(), Snowflake::from_u64(guild.owner_id.get()));
        let members: HashSet<Snowflake> = guild
            .members
            .keys()
            .map(|user| Snowflake::from_u64(user.get()))
            .collect();
        debug!(guild = %id, members = members.len(), "Tracking guild");
        self.presence.write().insert(id, members);
    }

    /// Stop tracking a guild the agent left.
    pub fn forget_guild(&self, guild: &Snowflake) {
        self.owners.write().remove(guild);
        self.presence.write().remove(guild);
    }

    /// Note that `user` is present in `guild`.
    pub fn remember_member(&self, guild: &Snowflake, user: &Snowflake) {
        self.presence
            .write()
            .entry(guild.clone())
            .or_default()
            .insert(user.clone());
    }

    /// Note that `user` left `guild`.
    pub fn forget_member(&self, guild: &Snowflake, user: &Snowflake) {
        if let Some(members) = self.presence.write().get_mut(guild) {
            members.remove(user);
        }
    }

    fn cached_presence(&self, guild: &Snowflake, user: &Snowflake) -> bool {
        self.presence
            .read()
            .get(guild)
            .is_some_and(|members| members.contains(user))
    }
}

#[async_trait]
impl ModerationGateway for SerenityGateway {
    fn operator_id(&self) -> Snowflake {
        self.operator.clone()
    }

    async fn guilds(&self) -> GatewayResult<Vec<GuildSummary>> {
        let known: Vec<GuildSummary> = self
            .owners
            .read()
            .iter()
            .map(|(id, owner)| GuildSummary::new(id.clone(), owner.clone()))
            .collect();
        if !known.is_empty() {
            return Ok(known);
        }

        let infos = self
            .http
            .get_guilds(None, None)
            .await
            .map_err(|e| gateway_error("Failed to list guilds", e))?;
        let mut guilds = Vec::with_capacity(infos.len());
        for info in infos {
            let id = Snowflake::from_u64(info.id.get());
            let owner = self.guild_owner(&id).await?;
            guilds.push(GuildSummary::new(id, owner));
        }
        Ok(guilds)
    }

    async fn guild_owner(&self, guild: &Snowflake) -> GatewayResult<Snowflake> {
        if let Some(owner) = self.owners.read().get(guild) {
            return Ok(owner.clone());
        }
        let partial = self
            .http
            .get_guild(platform_id::<GuildId>(guild)?)
            .await
            .map_err(|e| gateway_error("Failed to fetch guild", e))?;
        let owner = Snowflake::from_u64(partial.owner_id.get());
        self.owners.write().insert(guild.clone(), owner.clone());
        Ok(owner)
    }

    #[instrument(skip(self), fields(guild = %guild, kind = %kind))]
    async fn audit_entries(
        &self,
        guild: &Snowflake,
        kind: AuditKind,
        limit: u8,
    ) -> GatewayResult<Vec<AuditEntry>> {
        let logs = platform_id::<GuildId>(guild)?
            .audit_logs(&self.http, Some(audit_action(kind)), None, None, Some(limit))
            .await
            .map_err(|e| gateway_error("Failed to read audit log", e))?;
        Ok(logs
            .entries
            .into_iter()
            .map(|entry| {
                AuditEntry::new(
                    entry.target_id.map(|id| Snowflake::from_u64(id.get())),
                    Some(Snowflake::from_u64(entry.user_id.get())),
                    to_utc(entry.id.created_at()),
                )
            })
            .collect())
    }

    async fn own_capabilities(&self, guild: &Snowflake) -> GatewayResult<OwnCapabilities> {
        let guild_id = platform_id::<GuildId>(guild)?;
        let partial = self
            .http
            .get_guild(guild_id)
            .await
            .map_err(|e| gateway_error("Failed to fetch guild", e))?;
        let me = self
            .http
            .get_member(guild_id, platform_id::<UserId>(&self.operator)?)
            .await
            .map_err(|e| gateway_error("Failed to fetch own member", e))?;

        let everyone = RoleId::new(guild_id.get());
        let mut permissions = partial
            .roles
            .get(&everyone)
            .map(|role| role.permissions)
            .unwrap_or_else(Permissions::empty);
        for role in &me.roles {
            if let Some(role) = partial.roles.get(role) {
                permissions |= role.permissions;
            }
        }
        Ok(capabilities_from(
            permissions,
            partial.owner_id.get() == me.user.id.get(),
        ))
    }

    async fn is_member(&self, guild: &Snowflake, user: &Snowflake) -> GatewayResult<bool> {
        if self.cached_presence(guild, user) {
            return Ok(true);
        }
        let result = self
            .http
            .get_member(platform_id::<GuildId>(guild)?, platform_id::<UserId>(user)?)
            .await;
        match result {
            Ok(_) => {
                self.remember_member(guild, user);
                Ok(true)
            }
            Err(e) => {
                let err = gateway_error("Failed to fetch member", e);
                if matches!(err.kind(), GatewayErrorKind::NotFound(_)) {
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn ban(&self, guild: &Snowflake, user: &Snowflake, reason: &str) -> GatewayResult<()> {
        platform_id::<GuildId>(guild)?
            .ban_with_reason(&self.http, platform_id::<UserId>(user)?, 0, reason)
            .await
            .map_err(|e| gateway_error("Failed to ban", e))?;
        self.forget_member(guild, user);
        Ok(())
    }

    async fn unban(&self, guild: &Snowflake, user: &Snowflake, reason: &str) -> GatewayResult<()> {
        self.http
            .remove_ban(
                platform_id::<GuildId>(guild)?,
                platform_id::<UserId>(user)?,
                Some(reason),
            )
            .await
            .map_err(|e| gateway_error("Failed to unban", e))
    }

    async fn kick(&self, guild: &Snowflake, user: &Snowflake, reason: &str) -> GatewayResult<()> {
        platform_id::<GuildId>(guild)?
            .kick_with_reason(&self.http, platform_id::<UserId>(user)?, reason)
            .await
            .map_err(|e| gateway_error("Failed to kick", e))?;
        self.forget_member(guild, user);
        Ok(())
    }

    async fn roles(&self, guild: &Snowflake) -> GatewayResult<Vec<RoleState>> {
        let roles = platform_id::<GuildId>(guild)?
            .roles(&self.http)
            .await
            .map_err(|e| gateway_error("Failed to list roles", e))?;
        Ok(roles.values().map(role_state).collect())
    }

    async fn set_role_permissions(
        &self,
        guild: &Snowflake,
        role: &Snowflake,
        permissions: u64,
        reason: &str,
    ) -> GatewayResult<()> {
        let edit = EditRole::new()
            .permissions(Permissions::from_bits_truncate(permissions))
            .audit_log_reason(reason);
        platform_id::<GuildId>(guild)?
            .edit_role(&self.http, platform_id::<RoleId>(role)?, edit)
            .await
            .map_err(|e| gateway_error("Failed to edit role permissions", e))?;
        Ok(())
    }

    async fn set_role_position(
        &self,
        guild: &Snowflake,
        role: &Snowflake,
        position: u16,
        reason: &str,
    ) -> GatewayResult<()> {
        self.http
            .edit_role_position(
                platform_id::<GuildId>(guild)?,
                platform_id::<RoleId>(role)?,
                position,
                Some(reason),
            )
            .await
            .map_err(|e| gateway_error("Failed to move role", e))?;
        Ok(())
    }

    async fn log_channel(&self, _guild: &Snowflake) -> Option<Snowflake> {
        self.log_channel.clone()
    }

    async fn send_notice(&self, channel: &Snowflake, notice: &Notice) -> GatewayResult<()> {
        let mut embed = CreateEmbed::new()
            .title(notice.title())
            .description(notice.description())
            .colour(*notice.color());
        if let Ok(timestamp) = Timestamp::from_unix_timestamp(notice.timestamp().timestamp()) {
            embed = embed.timestamp(timestamp);
        }
        platform_id::<ChannelId>(channel)?
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await
            .map_err(|e| gateway_error("Failed to post notice", e))?;
        Ok(())
    }

    async fn direct_message(&self, user: &Snowflake, text: &str) -> GatewayResult<()> {
        let dm = platform_id::<UserId>(user)?
            .create_dm_channel(&self.http)
            .await
            .map_err(|e| {
                bastion_error::GatewayError::new(GatewayErrorKind::Unreachable(e.to_string()))
            })?;
        dm.id
            .send_message(&self.http, CreateMessage::new().content(text))
            .await
            .map_err(|e| {
                bastion_error::GatewayError::new(GatewayErrorKind::Unreachable(e.to_string()))
            })?;
        Ok(())
    }
}
