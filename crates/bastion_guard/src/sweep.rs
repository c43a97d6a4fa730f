//! Periodic re-assertion of the deny-list against live membership.

use crate::GuardResult;
use crate::gateway::ModerationGateway;
use crate::notify::{self, tag};
use bastion_core::{Notice, Snowflake, palette};
use bastion_store::{IdentifierStore, SetName};
use derive_getters::Getters;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

/// Ban reason attached by the sweep.
pub const SWEEP_BAN_REASON: &str = "Auto-blacklist enforcement (present in guild)";

/// Counters from one pass over every server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct SweepReport {
    guilds: usize,
    checked: usize,
    banned: usize,
    failed: usize,
}

/// Bans deny-listed identifiers that are present in a server.
pub struct DenyListSweeper {
    gateway: Arc<dyn ModerationGateway>,
    store: IdentifierStore,
    interval: Duration,
}

impl DenyListSweeper {
    /// Create a sweeper that runs every `interval` once spawned.
    pub fn new(gateway: Arc<dyn ModerationGateway>, store: IdentifierStore, interval: Duration) -> Self {
        Self {
            gateway,
            store,
            interval,
        }
    }

    /// One pass over every server.
    ///
    /// Allow-listed and protected identifiers are skipped. Lookup and ban
    /// failures are counted and left for the next pass.
    #[instrument(skip(self))]
    pub async fn sweep_once(&self) -> GuardResult<SweepReport> {
        let deny = self.store.load(SetName::DenyList).await?;
        let mut report = SweepReport::default();
        if deny.is_empty() {
            return Ok(report);
        }
        let allow = self.store.load(SetName::AllowList).await?;
        let operator = self.gateway.operator_id();

        for guild in self.gateway.guilds().await? {
            report.guilds += 1;
            for id in deny.iter() {
                if allow.contains(id) || *id == operator || id == guild.owner() {
                    continue;
                }
                report.checked += 1;
                match self.enforce(guild.id(), id).await {
                    Ok(true) => report.banned += 1,
                    Ok(false) => {}
                    Err(e) => {
                        report.failed += 1;
                        debug!(guild = %guild.id(), id = %id, error = %e, "Sweep action failed");
                    }
                }
            }
        }
        if report.banned > 0 {
            info!(banned = report.banned, "Deny-list sweep removed members");
        }
        Ok(report)
    }

    async fn enforce(&self, guild: &Snowflake, id: &Snowflake) -> GuardResult<bool> {
        if !self.gateway.is_member(guild, id).await? {
            return Ok(false);
        }
        self.gateway.ban(guild, id, SWEEP_BAN_REASON).await?;
        notify::post(
            self.gateway.as_ref(),
            guild,
            Notice::new(
                "🚫 Auto-Banned (deny-list, present)",
                format!("{} was banned (was in guild).", tag(id)),
                palette::ALERT,
            ),
        )
        .await;
        Ok(true)
    }

    /// Run [`sweep_once`](Self::sweep_once) on a fixed interval until the
    /// runtime shuts down.
    ///
    /// Each pass is spawned on its own task, so a slow pass never delays the
    /// next tick.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_ms = self.interval.as_millis() as u64, "Deny-list sweep started");
            loop {
                ticker.tick().await;
                let sweeper = Arc::clone(&self);
                tokio::spawn(async move {
                    if let Err(e) = sweeper.sweep_once().await {
                        warn!(error = %e, "Deny-list sweep failed");
                    }
                });
            }
        })
    }
}
