//! Serenity event handler that feeds the enforcement engine.
//!
//! Every callback converts the event into Bastion types, runs the matching
//! rule, and logs the outcome. Errors stop here: they are logged with
//! `warn!` and never reach serenity.

use crate::SerenityGateway;
use crate::conversions::role_state;
use bastion_core::{Notice, Snowflake, palette};
use bastion_guard::{
    DenyListSweeper, EnforcementEngine, GuardResult, ModerationGateway, OperatorConsole, Outcome,
};
use bastion_store::{FeatureRegistry, SeenMembers};
use serenity::async_trait;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::client::{Context, EventHandler};
use serenity::model::channel::{GuildChannel, Message};
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::guild::{Guild, Member, Role, UnavailableGuild};
use serenity::model::id::{GuildId, RoleId};
use serenity::model::user::User;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Event handler for the Bastion bot.
pub struct BastionHandler {
    gateway: Arc<SerenityGateway>,
    engine: Arc<EnforcementEngine>,
    console: Arc<OperatorConsole>,
    sweeper: Arc<DenyListSweeper>,
    features: Arc<FeatureRegistry>,
    seen: SeenMembers,
    sweep_started: AtomicBool,
}

impl BastionHandler {
    /// Create a handler.
    pub fn new(
        gateway: Arc<SerenityGateway>,
        engine: Arc<EnforcementEngine>,
        console: Arc<OperatorConsole>,
        sweeper: Arc<DenyListSweeper>,
        features: Arc<FeatureRegistry>,
        seen: SeenMembers,
    ) -> Self {
        Self {
            gateway,
            engine,
            console,
            sweeper,
            features,
            seen,
            sweep_started: AtomicBool::new(false),
        }
    }

    /// Gateway intents the handler depends on.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::GUILD_MODERATION
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    fn report(event: &str, result: GuardResult<Outcome>) {
        match result {
            Ok(outcome) => debug!(event, outcome = %outcome, "Event handled"),
            Err(e) => warn!(event, error = %e, "Event handler failed"),
        }
    }
}

fn sf(id: u64) -> Snowflake {
    Snowflake::from_u64(id)
}

#[async_trait]
impl EventHandler for BastionHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_user = %ready.user.name,
            bot_id = %ready.user.id,
            guilds = ready.guilds.len(),
            "Bot connected to Discord"
        );

        for guild in &ready.guilds {
            if let Err(e) = self.engine.snapshot_guild(&sf(guild.id.get())).await {
                warn!(guild_id = %guild.id, error = %e, "Initial role snapshot failed");
            }
        }

        match self.features.load().await {
            Ok(flags) => {
                if let Some(first) = ready.guilds.first() {
                    let guild = sf(first.id.get());
                    if let Some(channel) = self.gateway.log_channel(&guild).await {
                        let notice =
                            Notice::new("🧩 Feature Flags Loaded", flags.pretty(), palette::INFO);
                        if let Err(e) = self.gateway.send_notice(&channel, &notice).await {
                            warn!(error = %e, "Failed to announce feature flags");
                        }
                    }
                }
            }
            Err(e) => warn!(error = %e, "Feature flags load error"),
        }

        if !self.sweep_started.swap(true, Ordering::SeqCst) {
            Arc::clone(&self.sweeper).spawn();
        }
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        info!(guild_id = %guild.id, guild_name = %guild.name, "Guild available");
        self.gateway.track_guild(&guild);
    }

    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        if !incomplete.unavailable {
            info!(guild_id = %incomplete.id, "Left guild");
            self.gateway.forget_guild(&sf(incomplete.id.get()));
        }
    }

    async fn guild_ban_addition(&self, _ctx: Context, guild_id: GuildId, banned_user: User) {
        let guild = sf(guild_id.get());
        let user = sf(banned_user.id.get());
        self.gateway.forget_member(&guild, &user);
        Self::report(
            "ban_add",
            self.engine
                .on_ban_added(&guild, &user, &banned_user.tag())
                .await,
        );
    }

    async fn guild_member_removal(
        &self,
        _ctx: Context,
        guild_id: GuildId,
        user: User,
        _member_data_if_available: Option<Member>,
    ) {
        let guild = sf(guild_id.get());
        let member = sf(user.id.get());
        self.gateway.forget_member(&guild, &member);
        Self::report(
            "member_remove",
            self.engine
                .on_member_removed(&guild, &member, &user.tag())
                .await,
        );
    }

    async fn guild_member_addition(&self, _ctx: Context, new_member: Member) {
        let guild = sf(new_member.guild_id.get());
        let member = sf(new_member.user.id.get());
        self.gateway.remember_member(&guild, &member);

        if !new_member.user.bot
            && let Err(e) = self.seen.record([member.clone()]).await
        {
            warn!(user_id = %member, error = %e, "Failed to record member");
        }
        Self::report(
            "member_add",
            self.engine
                .on_member_added(&guild, &member, &new_member.user.tag(), new_member.user.bot)
                .await,
        );
    }

    async fn channel_delete(
        &self,
        _ctx: Context,
        channel: GuildChannel,
        _messages: Option<Vec<Message>>,
    ) {
        Self::report(
            "channel_delete",
            self.engine
                .on_channel_deleted(
                    &sf(channel.guild_id.get()),
                    &sf(channel.id.get()),
                    &channel.name,
                )
                .await,
        );
    }

    async fn guild_role_create(&self, _ctx: Context, new: Role) {
        let outcome = self
            .engine
            .on_role_created(&sf(new.guild_id.get()), &role_state(&new))
            .await;
        Self::report("role_create", Ok(outcome));
    }

    async fn guild_role_update(&self, _ctx: Context, _old: Option<Role>, new: Role) {
        Self::report(
            "role_update",
            self.engine
                .on_role_updated(&sf(new.guild_id.get()), &role_state(&new))
                .await,
        );
    }

    async fn guild_role_delete(
        &self,
        _ctx: Context,
        guild_id: GuildId,
        removed_role_id: RoleId,
        removed_role_data_if_available: Option<Role>,
    ) {
        let name = removed_role_data_if_available
            .map(|role| role.name)
            .unwrap_or_else(|| removed_role_id.to_string());
        Self::report(
            "role_delete",
            self.engine
                .on_role_deleted(&sf(guild_id.get()), &sf(removed_role_id.get()), &name)
                .await,
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(guild_id) = msg.guild_id else {
            return;
        };
        let guild = sf(guild_id.get());
        let replies = match self
            .console
            .handle(&guild, &sf(msg.author.id.get()), &msg.content)
            .await
        {
            Ok(replies) => replies,
            Err(e) => {
                warn!(error = %e, "Operator command failed");
                return;
            }
        };

        let log_channel = self.gateway.log_channel(&guild).await;
        for reply in replies {
            let sent = match &log_channel {
                Some(channel) => self.gateway.send_notice(channel, &reply).await,
                None => {
                    let embed = CreateEmbed::new()
                        .title(reply.title())
                        .description(reply.description())
                        .colour(*reply.color());
                    msg.channel_id
                        .send_message(&ctx.http, CreateMessage::new().embed(embed))
                        .await
                        .map(|_| ())
                        .map_err(|e| crate::conversions::gateway_error("Failed to reply", e))
                }
            };
            if let Err(e) = sent {
                warn!(error = %e, "Failed to deliver command reply");
            }
        }
    }
}
