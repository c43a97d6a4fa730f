//! Role state as observed on the platform.

use crate::Snowflake;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A role as reported by the platform at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct RoleState {
    id: Snowflake,
    name: String,
    permissions: u64,
    position: u16,
}

impl RoleState {
    /// Create a role observation.
    pub fn new(id: Snowflake, name: impl Into<String>, permissions: u64, position: u16) -> Self {
        Self {
            id,
            name: name.into(),
            permissions,
            position,
        }
    }

    /// The comparable part of this role.
    pub fn baseline(&self) -> RoleBaseline {
        RoleBaseline {
            permissions: self.permissions,
            position: self.position,
        }
    }
}

/// Last-known-authorized permission bitmask and position of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleBaseline {
    /// Permission bitmask.
    pub permissions: u64,
    /// Ordinal position in the role hierarchy.
    pub position: u16,
}
