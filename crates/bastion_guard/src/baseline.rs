//! Per-server role baselines and the revert guard.

use bastion_core::{RoleBaseline, RoleState, Snowflake};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// State the engine keeps for one server.
#[derive(Debug, Default)]
pub struct GuildContext {
    baselines: HashMap<Snowflake, RoleBaseline>,
    reverting: HashSet<Snowflake>,
}

impl GuildContext {
    /// Baseline of `role`, if one was recorded.
    pub fn baseline(&self, role: &Snowflake) -> Option<RoleBaseline> {
        self.baselines.get(role).copied()
    }

    /// Number of roles with a baseline.
    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    /// Whether no role has a baseline.
    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }
}

/// Role baselines for every server, owned by one engine instance.
///
/// The lock is only held for short synchronous updates, never across a
/// platform call.
#[derive(Debug, Default)]
pub struct BaselineBook {
    guilds: Mutex<HashMap<Snowflake, GuildContext>>,
}

impl BaselineBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every baseline of `guild` with the given roles.
    pub fn snapshot(&self, guild: &Snowflake, roles: &[RoleState]) {
        let mut guilds = self.guilds.lock();
        let context = guilds.entry(guild.clone()).or_default();
        context.baselines = roles
            .iter()
            .map(|role| (role.id().clone(), role.baseline()))
            .collect();
        debug!(guild = %guild, roles = context.baselines.len(), "Snapshotted role baselines");
    }

    /// Baseline of `role` in `guild`.
    pub fn get(&self, guild: &Snowflake, role: &Snowflake) -> Option<RoleBaseline> {
        self.guilds.lock().get(guild)?.baseline(role)
    }

    /// Record `role` as the accepted state.
    pub fn record(&self, guild: &Snowflake, role: &RoleState) {
        self.record_baseline(guild, role.id(), role.baseline());
    }

    /// Record an explicit baseline for `role`.
    pub fn record_baseline(&self, guild: &Snowflake, role: &Snowflake, baseline: RoleBaseline) {
        self.guilds
            .lock()
            .entry(guild.clone())
            .or_default()
            .baselines
            .insert(role.clone(), baseline);
    }

    /// Forget `role`.
    pub fn remove(&self, guild: &Snowflake, role: &Snowflake) {
        if let Some(context) = self.guilds.lock().get_mut(guild) {
            context.baselines.remove(role);
        }
    }

    /// Number of roles with a baseline in `guild`.
    pub fn role_count(&self, guild: &Snowflake) -> usize {
        self.guilds.lock().get(guild).map(GuildContext::len).unwrap_or(0)
    }

    /// Whether a compensating write to `role` is in flight.
    pub fn is_reverting(&self, guild: &Snowflake, role: &Snowflake) -> bool {
        self.guilds
            .lock()
            .get(guild)
            .is_some_and(|context| context.reverting.contains(role))
    }

    /// Mark `role` as being reverted until the returned guard is dropped.
    ///
    /// Returns `None` when a revert of the same role is already in flight.
    pub fn begin_revert(&self, guild: &Snowflake, role: &Snowflake) -> Option<RevertGuard<'_>> {
        let inserted = self
            .guilds
            .lock()
            .entry(guild.clone())
            .or_default()
            .reverting
            .insert(role.clone());
        inserted.then(|| RevertGuard {
            book: self,
            guild: guild.clone(),
            role: role.clone(),
        })
    }

    fn end_revert(&self, guild: &Snowflake, role: &Snowflake) {
        if let Some(context) = self.guilds.lock().get_mut(guild) {
            context.reverting.remove(role);
        }
    }
}

/// Marks one role as being reverted; releases the mark on drop.
#[derive(Debug)]
pub struct RevertGuard<'a> {
    book: &'a BaselineBook,
    guild: Snowflake,
    role: Snowflake,
}

impl Drop for RevertGuard<'_> {
    fn drop(&mut self) {
        self.book.end_revert(&self.guild, &self.role);
    }
}
