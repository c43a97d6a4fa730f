//! Conversions between serenity models and Bastion types.

use bastion_core::{RoleState, Snowflake};
use bastion_error::{GatewayError, GatewayErrorKind};
use bastion_guard::{AuditKind, GatewayResult, OwnCapabilities};
use chrono::{DateTime, Utc};
use serenity::model::Timestamp;
use serenity::model::guild::Role;
use serenity::model::guild::audit_log::{Action, ChannelAction, MemberAction, RoleAction};
use serenity::model::permissions::Permissions;
use std::num::NonZeroU64;

/// Convert a stored identifier into a serenity id type.
///
/// # Errors
///
/// Returns `InvalidId` for identifiers that do not fit a non-zero `u64`.
#[track_caller]
pub fn platform_id<T: From<NonZeroU64>>(id: &Snowflake) -> GatewayResult<T> {
    match id.to_u64().and_then(NonZeroU64::new) {
        Some(raw) => Ok(T::from(raw)),
        None => Err(GatewayError::new(GatewayErrorKind::InvalidId(id.to_string()))),
    }
}

/// Audit log action queried for each [`AuditKind`].
pub fn audit_action(kind: AuditKind) -> Action {
    match kind {
        AuditKind::BanAdd => Action::Member(MemberAction::BanAdd),
        AuditKind::MemberKick => Action::Member(MemberAction::Kick),
        AuditKind::BotAdd => Action::Member(MemberAction::BotAdd),
        AuditKind::ChannelDelete => Action::Channel(ChannelAction::Delete),
        AuditKind::RoleDelete => Action::Role(RoleAction::Delete),
        AuditKind::RoleUpdate => Action::Role(RoleAction::Update),
    }
}

/// Role as the engine sees it.
pub fn role_state(role: &Role) -> RoleState {
    RoleState::new(
        Snowflake::from_u64(role.id.get()),
        role.name.clone(),
        role.permissions.bits(),
        role.position,
    )
}

/// Capabilities granted by an effective permission set.
pub fn capabilities_from(permissions: Permissions, is_owner: bool) -> OwnCapabilities {
    if is_owner || permissions.contains(Permissions::ADMINISTRATOR) {
        return OwnCapabilities::all();
    }
    OwnCapabilities {
        view_audit_log: permissions.contains(Permissions::VIEW_AUDIT_LOG),
        ban_members: permissions.contains(Permissions::BAN_MEMBERS),
        kick_members: permissions.contains(Permissions::KICK_MEMBERS),
        manage_roles: permissions.contains(Permissions::MANAGE_ROLES),
    }
}

/// Serenity timestamp to chrono, falling back to now for out-of-range values.
pub fn to_utc(timestamp: Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp.unix_timestamp(), 0).unwrap_or_else(Utc::now)
}

/// Map a serenity error onto the gateway error kinds.
///
/// HTTP 404 becomes `NotFound` and 403 becomes `MissingCapability`.
#[track_caller]
pub fn gateway_error(context: &str, err: serenity::Error) -> GatewayError {
    let status = match &err {
        serenity::Error::Http(http) => http.status_code().map(|s| s.as_u16()),
        _ => None,
    };
    let message = format!("{context}: {err}");
    let kind = match status {
        Some(404) => GatewayErrorKind::NotFound(message),
        Some(403) => GatewayErrorKind::MissingCapability(message),
        _ => GatewayErrorKind::Api(message),
    };
    GatewayError::new(kind)
}
