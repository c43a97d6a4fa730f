//! Event-triggered enforcement rules.
//!
//! Each handler follows the same shape: feature gate, capability check,
//! attribution through the audit trail, classification of the executor, then
//! compensating actions and a notice. Handlers return an [`Outcome`] describing
//! which branch was taken so the dispatcher (and tests) can tell a skipped
//! event from an enforced one.

use crate::GuardResult;
use crate::baseline::BaselineBook;
use crate::gateway::{AuditKind, ModerationGateway, OwnCapabilities};
use crate::notify::{self, tag};
use crate::policy::PolicyView;
use crate::resolver::AuditResolver;
use crate::settings::EngineSettings;
use bastion_core::{Capability, Notice, RoleState, Snowflake, palette};
use bastion_store::{FeatureRegistry, IdentifierStore, SetName};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Which branch an event handler took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Outcome {
    /// The rule's feature flag is off.
    Disabled,
    /// The event does not concern this rule (a human joining, for instance).
    NotApplicable,
    /// The agent lacks a permission the rule needs.
    MissingCapability,
    /// No audit entry attributes the event.
    NoEvidence,
    /// The agent itself performed the action.
    SelfAction,
    /// The executor (or added bot) is allow-listed.
    Authorized,
    /// The executor is the server owner or the agent.
    Protected,
    /// A role was seen for the first time and adopted as baseline.
    FirstObservation,
    /// An unattributed role change was adopted as the new baseline.
    Adopted,
    /// The role matches its baseline.
    Unchanged,
    /// The update was caused by the agent's own revert.
    Reverting,
    /// A compensating action was attempted and failed.
    ReversalFailed,
    /// The rule acted.
    Enforced,
}

/// Applies the moderation rules to platform events.
///
/// One engine serves every server the agent is in; per-server state lives in
/// its [`BaselineBook`].
pub struct EnforcementEngine {
    gateway: Arc<dyn ModerationGateway>,
    store: IdentifierStore,
    features: Arc<FeatureRegistry>,
    baselines: Arc<BaselineBook>,
    resolver: AuditResolver,
    settings: EngineSettings,
}

impl EnforcementEngine {
    /// Create an engine.
    pub fn new(
        gateway: Arc<dyn ModerationGateway>,
        store: IdentifierStore,
        features: Arc<FeatureRegistry>,
        settings: EngineSettings,
    ) -> Self {
        let resolver = AuditResolver::new(
            Arc::clone(&gateway),
            *settings.ban_retry_delay(),
            *settings.audit_limit(),
        );
        Self {
            gateway,
            store,
            features,
            baselines: Arc::new(BaselineBook::new()),
            resolver,
            settings,
        }
    }

    /// Read-only view over the engine's policy state.
    pub fn policy(&self) -> PolicyView {
        PolicyView::new(
            self.store.clone(),
            Arc::clone(&self.features),
            Arc::clone(&self.baselines),
        )
    }

    /// The role baselines.
    pub fn baselines(&self) -> &BaselineBook {
        &self.baselines
    }

    /// The settings in use.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Record every role of `guild` as its baseline.
    #[instrument(skip(self), fields(guild = %guild))]
    pub async fn snapshot_guild(&self, guild: &Snowflake) -> GuardResult<usize> {
        let roles = self.gateway.roles(guild).await?;
        self.baselines.snapshot(guild, &roles);
        info!(roles = roles.len(), "Role baselines captured");
        Ok(roles.len())
    }

    /// A member was banned.
    ///
    /// An unauthorized ban is lifted and its executor deny-listed.
    #[instrument(skip(self, target_name), fields(guild = %guild, target = %target))]
    pub async fn on_ban_added(
        &self,
        guild: &Snowflake,
        target: &Snowflake,
        target_name: &str,
    ) -> GuardResult<Outcome> {
        if !self.features.is_enabled(Capability::Ban) {
            return Ok(Outcome::Disabled);
        }
        let caps = self.capabilities(guild).await;
        if !caps.view_audit_log {
            return Ok(Outcome::MissingCapability);
        }

        let Some(executor) = self
            .resolver
            .resolve_executor(guild, AuditKind::BanAdd, target, *self.settings.ban_window())
            .await
        else {
            return Ok(Outcome::NoEvidence);
        };
        if self.is_self(&executor) {
            return Ok(Outcome::SelfAction);
        }
        if self.store.contains(SetName::AllowList, &executor).await? {
            debug!(executor = %executor, "Ban by allow-listed executor");
            return Ok(Outcome::Authorized);
        }

        if !caps.ban_members {
            self.notify(
                guild,
                Notice::new(
                    "⚠️ Ban Detected (cannot reverse)",
                    format!(
                        "Executor: {}\nReason: Missing **Ban Members** permission.",
                        tag(&executor)
                    ),
                    palette::WARNING,
                ),
            )
            .await;
            return Ok(Outcome::MissingCapability);
        }

        if let Err(e) = self
            .gateway
            .unban(guild, target, "Auto-undo: ban by non-allow-listed executor")
            .await
        {
            warn!(error = %e, "Failed to reverse ban");
            let detail: String = e.to_string().chars().take(180).collect();
            self.notify(
                guild,
                Notice::new(
                    "❌ Failed to Unban",
                    format!("Tried to reverse ban of `{target}`.\nError: {detail}"),
                    palette::DENY,
                ),
            )
            .await;
            return Ok(Outcome::ReversalFailed);
        }
        info!(executor = %executor, "Reversed unauthorized ban");
        self.notify(
            guild,
            Notice::new(
                "🔓 Auto-Unbanned",
                format!("Reversed ban of {}", tag(target)),
                palette::SUCCESS,
            ),
        )
        .await;

        self.deny_list(
            guild,
            &executor,
            &format!("Unauthorized ban of {target_name}"),
        )
        .await?;
        Ok(Outcome::Enforced)
    }

    /// A channel was deleted; its deleter is deny-listed.
    #[instrument(skip(self, name), fields(guild = %guild, channel = %channel))]
    pub async fn on_channel_deleted(
        &self,
        guild: &Snowflake,
        channel: &Snowflake,
        name: &str,
    ) -> GuardResult<Outcome> {
        self.deletion_rule(
            guild,
            Capability::Channel,
            AuditKind::ChannelDelete,
            channel,
            format!("Deleted channel #{name} ({channel})"),
        )
        .await
    }

    /// A role was deleted.
    ///
    /// The baseline is always dropped; the deleter is deny-listed when the
    /// rule is enabled.
    #[instrument(skip(self, name), fields(guild = %guild, role = %role))]
    pub async fn on_role_deleted(
        &self,
        guild: &Snowflake,
        role: &Snowflake,
        name: &str,
    ) -> GuardResult<Outcome> {
        self.baselines.remove(guild, role);
        self.deletion_rule(
            guild,
            Capability::RoleDelete,
            AuditKind::RoleDelete,
            role,
            format!("Deleted role @{name} ({role})"),
        )
        .await
    }

    async fn deletion_rule(
        &self,
        guild: &Snowflake,
        capability: Capability,
        kind: AuditKind,
        target: &Snowflake,
        reason: String,
    ) -> GuardResult<Outcome> {
        if !self.features.is_enabled(capability) {
            return Ok(Outcome::Disabled);
        }
        if !self.capabilities(guild).await.view_audit_log {
            return Ok(Outcome::MissingCapability);
        }
        let Some(executor) = self
            .resolver
            .resolve_executor(guild, kind, target, *self.settings.event_window())
            .await
        else {
            return Ok(Outcome::NoEvidence);
        };
        if self.is_self(&executor) {
            return Ok(Outcome::SelfAction);
        }
        self.deny_list(guild, &executor, &reason).await
    }

    /// A role was created; it becomes its own baseline.
    #[instrument(skip(self, role), fields(guild = %guild, role = %role.id()))]
    pub async fn on_role_created(&self, guild: &Snowflake, role: &RoleState) -> Outcome {
        self.baselines.record(guild, role);
        self.notify(
            guild,
            Notice::new(
                "🗂️ Role Created (snapshotted)",
                format!("@{} `{}` captured for baseline", role.name(), role.id()),
                palette::SNAPSHOT,
            ),
        )
        .await;
        Outcome::FirstObservation
    }

    /// A role's permissions or position changed.
    ///
    /// Changes by allow-listed executors, and changes no audit entry
    /// attributes, become the new baseline. Repositioning one role shifts its
    /// neighbours without audit entries of their own, so only attributed drift
    /// is written back and its executor deny-listed.
    #[instrument(skip(self, role), fields(guild = %guild, role = %role.id()))]
    pub async fn on_role_updated(&self, guild: &Snowflake, role: &RoleState) -> GuardResult<Outcome> {
        if !self.features.is_enabled(Capability::RoleUpdate) {
            return Ok(Outcome::Disabled);
        }
        if self.baselines.is_reverting(guild, role.id()) {
            debug!("Update caused by an in-flight revert");
            return Ok(Outcome::Reverting);
        }
        if !self.capabilities(guild).await.view_audit_log {
            return Ok(Outcome::MissingCapability);
        }

        let executor = self
            .resolver
            .resolve_executor(
                guild,
                AuditKind::RoleUpdate,
                role.id(),
                *self.settings.event_window(),
            )
            .await;

        let Some(executor) = executor else {
            debug!("No audit entry for the change, adopting current state");
            self.baselines.record(guild, role);
            return Ok(Outcome::Adopted);
        };
        if self.is_self(&executor) {
            return Ok(Outcome::SelfAction);
        }
        if self.store.contains(SetName::AllowList, &executor).await? {
            self.baselines.record(guild, role);
            info!(executor = %executor, "Accepted role change by allow-listed executor");
            self.notify(
                guild,
                Notice::new(
                    "✅ Allow-list Bypass: Role Change Accepted",
                    format!(
                        "Role: @{} `{}`\nExecutor: {}",
                        role.name(),
                        role.id(),
                        tag(&executor)
                    ),
                    palette::SUCCESS,
                ),
            )
            .await;
            return Ok(Outcome::Authorized);
        }

        let Some(baseline) = self.baselines.get(guild, role.id()) else {
            debug!("No baseline yet, adopting current state");
            self.baselines.record(guild, role);
            return Ok(Outcome::FirstObservation);
        };

        let permissions_changed = *role.permissions() != baseline.permissions;
        let position_changed = *role.position() != baseline.position;
        if !permissions_changed && !position_changed {
            return Ok(Outcome::Unchanged);
        }

        let Some(guard) = self.baselines.begin_revert(guild, role.id()) else {
            return Ok(Outcome::Reverting);
        };
        let mut reverted = Vec::new();
        if permissions_changed {
            match self
                .gateway
                .set_role_permissions(
                    guild,
                    role.id(),
                    baseline.permissions,
                    "Auto-revert: permissions change detected",
                )
                .await
            {
                Ok(()) => reverted.push("• Permissions reverted"),
                Err(e) => warn!(error = %e, "Failed to revert role permissions"),
            }
        }
        if position_changed {
            match self
                .gateway
                .set_role_position(
                    guild,
                    role.id(),
                    baseline.position,
                    "Auto-revert: position change detected",
                )
                .await
            {
                Ok(()) => reverted.push("• Position reverted"),
                Err(e) => warn!(error = %e, "Failed to revert role position"),
            }
        }

        let mut body = format!("Role: @{} `{}`\n", role.name(), role.id());
        for line in &reverted {
            body.push_str(line);
            body.push('\n');
        }
        body.push_str(&format!("Executor: {}", tag(&executor)));
        info!(reverted = reverted.len(), "Reverted role change");
        self.notify(
            guild,
            Notice::new("↩️ Reverted Role Change", body, palette::WARNING),
        )
        .await;
        drop(guard);

        self.deny_list(
            guild,
            &executor,
            &format!("Updated role @{} ({}); auto-reverted", role.name(), role.id()),
        )
        .await?;
        self.baselines.record_baseline(guild, role.id(), baseline);

        Ok(if reverted.is_empty() {
            Outcome::ReversalFailed
        } else {
            Outcome::Enforced
        })
    }

    /// A member left; when the audit trail shows a kick, the kicker is
    /// deny-listed and the member invited back.
    ///
    /// Returns the deny-list outcome for the kicker.
    #[instrument(skip(self, member_name), fields(guild = %guild, member = %member))]
    pub async fn on_member_removed(
        &self,
        guild: &Snowflake,
        member: &Snowflake,
        member_name: &str,
    ) -> GuardResult<Outcome> {
        if !self.features.is_enabled(Capability::Kick) {
            return Ok(Outcome::Disabled);
        }
        if !self.capabilities(guild).await.view_audit_log {
            return Ok(Outcome::MissingCapability);
        }
        let Some(executor) = self
            .resolver
            .resolve_executor(
                guild,
                AuditKind::MemberKick,
                member,
                *self.settings.event_window(),
            )
            .await
        else {
            debug!("No kick entry, treating as a voluntary leave");
            return Ok(Outcome::NoEvidence);
        };
        if self.is_self(&executor) {
            return Ok(Outcome::SelfAction);
        }

        let listed = self
            .deny_list(guild, &executor, &format!("Kicked {member_name}"))
            .await?;

        let invite = format!(
            "You were kicked, but an auto-moderation policy allows you back.\n\
             Rejoin here: {}\nIf it expires, ask a moderator for a fresh link.",
            self.settings.reinvite_url()
        );
        if let Err(e) = self.gateway.direct_message(member, &invite).await {
            debug!(error = %e, "Could not deliver rejoin invite");
        }

        let (title, action) = match listed {
            Outcome::Enforced => ("🥾 Kick Detected → Kicker Deny-listed", "Kicker deny-listed"),
            Outcome::Protected => ("🥾 Kick Detected", "Kicker is protected, not deny-listed"),
            _ => ("🥾 Kick Detected", "Kicker is allow-listed, not deny-listed"),
        };
        self.notify(
            guild,
            Notice::new(
                title,
                format!(
                    "Target: {}\nExecutor: {}\nAction: {action}; target sent a rejoin link.",
                    tag(member),
                    tag(&executor)
                ),
                palette::KICK,
            ),
        )
        .await;
        Ok(listed)
    }

    /// A member joined; unauthorized bots are removed and deny-listed along
    /// with whoever added them.
    #[instrument(skip(self, member_name), fields(guild = %guild, member = %member))]
    pub async fn on_member_added(
        &self,
        guild: &Snowflake,
        member: &Snowflake,
        member_name: &str,
        is_bot: bool,
    ) -> GuardResult<Outcome> {
        if !is_bot {
            return Ok(Outcome::NotApplicable);
        }
        if !self.features.is_enabled(Capability::BotAdd) {
            return Ok(Outcome::Disabled);
        }
        if !self.capabilities(guild).await.view_audit_log {
            return Ok(Outcome::MissingCapability);
        }
        if self.store.contains(SetName::AllowList, member).await? {
            debug!("Allow-listed bot joined");
            return Ok(Outcome::Authorized);
        }

        let executor = self
            .resolver
            .resolve_executor(guild, AuditKind::BotAdd, member, *self.settings.event_window())
            .await;
        if executor.as_ref().is_some_and(|id| self.is_self(id)) {
            return Ok(Outcome::SelfAction);
        }

        if self.is_protected(guild, member).await? {
            return Ok(Outcome::Protected);
        }
        if let Err(e) = self
            .gateway
            .kick(guild, member, "Auto-moderation: unauthorized bot add")
            .await
        {
            warn!(error = %e, "Failed to remove unauthorized bot");
        }
        self.write_deny_list(guild, member).await?;
        info!(executor = ?executor.as_ref().map(Snowflake::as_str), "Removed unauthorized bot");

        let added_by = executor
            .as_ref()
            .map(|id| format!("Added by: {}\n", tag(id)))
            .unwrap_or_default();
        self.notify(
            guild,
            Notice::new(
                "🤖 Bot Added → Kicked & Deny-listed",
                format!(
                    "Bot: {}\n{added_by}Action: Bot kicked and deny-listed",
                    tag(member)
                ),
                palette::BOT,
            ),
        )
        .await;

        if let Some(executor) = &executor {
            self.deny_list(
                guild,
                executor,
                &format!("Added bot {member_name} ({member})"),
            )
            .await?;
        }
        Ok(Outcome::Enforced)
    }

    /// Deny-list `id` and announce it.
    ///
    /// Protected and allow-listed identifiers are never written.
    #[instrument(skip(self), fields(guild = %guild, id = %id))]
    pub async fn deny_list(
        &self,
        guild: &Snowflake,
        id: &Snowflake,
        reason: &str,
    ) -> GuardResult<Outcome> {
        let outcome = self.write_deny_list(guild, id).await?;
        if outcome == Outcome::Enforced {
            self.notify(
                guild,
                Notice::new(
                    "🛑 Added to Deny-list",
                    format!("{}\nReason: {reason}", tag(id)),
                    palette::DENY,
                ),
            )
            .await;
        }
        Ok(outcome)
    }

    async fn write_deny_list(&self, guild: &Snowflake, id: &Snowflake) -> GuardResult<Outcome> {
        if self.is_protected(guild, id).await? {
            debug!(id = %id, "Protected identifier, not deny-listing");
            return Ok(Outcome::Protected);
        }
        if self.store.contains(SetName::AllowList, id).await? {
            debug!(id = %id, "Allow-listed identifier, not deny-listing");
            return Ok(Outcome::Authorized);
        }
        self.store.add(SetName::DenyList, [id.as_str()]).await?;
        info!(id = %id, "Deny-listed");
        Ok(Outcome::Enforced)
    }

    fn is_self(&self, id: &Snowflake) -> bool {
        *id == self.gateway.operator_id()
    }

    async fn is_protected(&self, guild: &Snowflake, id: &Snowflake) -> GuardResult<bool> {
        if self.is_self(id) {
            return Ok(true);
        }
        Ok(self.gateway.guild_owner(guild).await? == *id)
    }

    async fn capabilities(&self, guild: &Snowflake) -> OwnCapabilities {
        match self.gateway.own_capabilities(guild).await {
            Ok(caps) => caps,
            Err(e) => {
                warn!(guild = %guild, error = %e, "Could not read own permissions");
                OwnCapabilities::default()
            }
        }
    }

    async fn notify(&self, guild: &Snowflake, notice: Notice) {
        notify::post(self.gateway.as_ref(), guild, notice).await;
    }
}
