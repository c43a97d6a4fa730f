//! In-memory gateway that records every call.

use async_trait::async_trait;
use bastion_core::{Notice, RoleState, Snowflake};
use bastion_error::{GatewayError, GatewayErrorKind};
use bastion_guard::{
    AuditEntry, AuditKind, GatewayResult, GuildSummary, ModerationGateway, OwnCapabilities,
};
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const GUILD: &str = "900000000001";
pub const OWNER: &str = "900000000002";
pub const OPERATOR: &str = "900000000003";
pub const LOG_CHANNEL: &str = "900000000004";

pub fn id(raw: &str) -> Snowflake {
    Snowflake::parse(raw).expect("test identifier")
}

/// A side effect the engine asked the platform to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Ban(Snowflake, String),
    Unban(Snowflake),
    Kick(Snowflake),
    SetPermissions(Snowflake, u64),
    SetPosition(Snowflake, u16),
}

#[derive(Default)]
struct MockState {
    members: HashSet<Snowflake>,
    audit: Vec<(AuditKind, AuditEntry)>,
    pending_audit: Vec<(AuditKind, AuditEntry)>,
    audit_queries: usize,
    roles: HashMap<Snowflake, RoleState>,
    calls: Vec<Call>,
    notices: Vec<Notice>,
    dms: Vec<(Snowflake, String)>,
}

/// Mock platform for one server owned by [`OWNER`].
pub struct MockGateway {
    state: Mutex<MockState>,
    capabilities: Mutex<OwnCapabilities>,
    fail_unban: bool,
    fail_ban: bool,
    fail_dm: bool,
    fail_permissions: bool,
    fail_audit: bool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            capabilities: Mutex::new(OwnCapabilities::all()),
            fail_unban: false,
            fail_ban: false,
            fail_dm: false,
            fail_permissions: false,
            fail_audit: false,
        }
    }

    pub fn with_unban_failure(mut self) -> Self {
        self.fail_unban = true;
        self
    }

    pub fn with_ban_failure(mut self) -> Self {
        self.fail_ban = true;
        self
    }

    pub fn with_dm_failure(mut self) -> Self {
        self.fail_dm = true;
        self
    }

    pub fn with_permission_failure(mut self) -> Self {
        self.fail_permissions = true;
        self
    }

    pub fn with_audit_failure(mut self) -> Self {
        self.fail_audit = true;
        self
    }

    pub fn set_capabilities(&self, caps: OwnCapabilities) {
        *self.capabilities.lock().unwrap() = caps;
    }

    pub fn add_member(&self, raw: &str) {
        self.state.lock().unwrap().members.insert(id(raw));
    }

    pub fn is_present(&self, raw: &str) -> bool {
        self.state.lock().unwrap().members.contains(&id(raw))
    }

    pub fn add_role(&self, role: RoleState) {
        self.state
            .lock()
            .unwrap()
            .roles
            .insert(role.id().clone(), role);
    }

    /// Audit entry created just now.
    pub fn push_audit(&self, kind: AuditKind, target: &str, executor: &str) {
        self.push_audit_aged(kind, target, executor, 0);
    }

    /// Audit entry created `age_secs` ago.
    pub fn push_audit_aged(&self, kind: AuditKind, target: &str, executor: &str, age_secs: i64) {
        let entry = AuditEntry::new(
            Some(id(target)),
            Some(id(executor)),
            Utc::now() - Duration::seconds(age_secs),
        );
        self.state.lock().unwrap().audit.insert(0, (kind, entry));
    }

    /// Audit entry that only becomes visible after the first query.
    pub fn push_late_audit(&self, kind: AuditKind, target: &str, executor: &str) {
        let entry = AuditEntry::new(Some(id(target)), Some(id(executor)), Utc::now());
        self.state.lock().unwrap().pending_audit.push((kind, entry));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.state.lock().unwrap().notices.clone()
    }

    pub fn notice_titles(&self) -> Vec<String> {
        self.notices().iter().map(|n| n.title().clone()).collect()
    }

    pub fn dms(&self) -> Vec<(Snowflake, String)> {
        self.state.lock().unwrap().dms.clone()
    }

    pub fn audit_queries(&self) -> usize {
        self.state.lock().unwrap().audit_queries
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn api_error(what: &str) -> GatewayError {
    GatewayError::new(GatewayErrorKind::Api(what.to_string()))
}

#[async_trait]
impl ModerationGateway for MockGateway {
    fn operator_id(&self) -> Snowflake {
        id(OPERATOR)
    }

    async fn guilds(&self) -> GatewayResult<Vec<GuildSummary>> {
        Ok(vec![GuildSummary::new(id(GUILD), id(OWNER))])
    }

    async fn guild_owner(&self, _guild: &Snowflake) -> GatewayResult<Snowflake> {
        Ok(id(OWNER))
    }

    async fn audit_entries(
        &self,
        _guild: &Snowflake,
        kind: AuditKind,
        limit: u8,
    ) -> GatewayResult<Vec<AuditEntry>> {
        let mut state = self.state.lock().unwrap();
        state.audit_queries += 1;
        if self.fail_audit {
            return Err(api_error("audit log unavailable"));
        }
        let entries = state
            .audit
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, e)| e.clone())
            .take(limit as usize)
            .collect();
        let pending = std::mem::take(&mut state.pending_audit);
        for item in pending {
            state.audit.insert(0, item);
        }
        Ok(entries)
    }

    async fn own_capabilities(&self, _guild: &Snowflake) -> GatewayResult<OwnCapabilities> {
        Ok(*self.capabilities.lock().unwrap())
    }

    async fn is_member(&self, _guild: &Snowflake, user: &Snowflake) -> GatewayResult<bool> {
        Ok(self.state.lock().unwrap().members.contains(user))
    }

    async fn ban(&self, _guild: &Snowflake, user: &Snowflake, reason: &str) -> GatewayResult<()> {
        if self.fail_ban {
            return Err(GatewayError::new(GatewayErrorKind::MissingCapability(
                "hierarchy".to_string(),
            )));
        }
        self.record(Call::Ban(user.clone(), reason.to_string()));
        self.state.lock().unwrap().members.remove(user);
        Ok(())
    }

    async fn unban(&self, _guild: &Snowflake, user: &Snowflake, _reason: &str) -> GatewayResult<()> {
        if self.fail_unban {
            return Err(api_error("unban rejected"));
        }
        self.record(Call::Unban(user.clone()));
        Ok(())
    }

    async fn kick(&self, _guild: &Snowflake, user: &Snowflake, _reason: &str) -> GatewayResult<()> {
        self.record(Call::Kick(user.clone()));
        self.state.lock().unwrap().members.remove(user);
        Ok(())
    }

    async fn roles(&self, _guild: &Snowflake) -> GatewayResult<Vec<RoleState>> {
        Ok(self.state.lock().unwrap().roles.values().cloned().collect())
    }

    async fn set_role_permissions(
        &self,
        _guild: &Snowflake,
        role: &Snowflake,
        permissions: u64,
        _reason: &str,
    ) -> GatewayResult<()> {
        if self.fail_permissions {
            return Err(GatewayError::new(GatewayErrorKind::MissingCapability(
                "role above agent".to_string(),
            )));
        }
        self.record(Call::SetPermissions(role.clone(), permissions));
        Ok(())
    }

    async fn set_role_position(
        &self,
        _guild: &Snowflake,
        role: &Snowflake,
        position: u16,
        _reason: &str,
    ) -> GatewayResult<()> {
        self.record(Call::SetPosition(role.clone(), position));
        Ok(())
    }

    async fn log_channel(&self, _guild: &Snowflake) -> Option<Snowflake> {
        Some(id(LOG_CHANNEL))
    }

    async fn send_notice(&self, _channel: &Snowflake, notice: &Notice) -> GatewayResult<()> {
        self.state.lock().unwrap().notices.push(notice.clone());
        Ok(())
    }

    async fn direct_message(&self, user: &Snowflake, text: &str) -> GatewayResult<()> {
        if self.fail_dm {
            return Err(GatewayError::new(GatewayErrorKind::Unreachable(
                "DMs closed".to_string(),
            )));
        }
        self.state
            .lock()
            .unwrap()
            .dms
            .push((user.clone(), text.to_string()));
        Ok(())
    }
}
