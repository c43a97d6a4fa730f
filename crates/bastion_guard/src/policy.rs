//! Read-only policy queries for peripheral components.

use crate::GuardResult;
use crate::baseline::BaselineBook;
use bastion_core::{Capability, RoleBaseline, Snowflake};
use bastion_store::{FeatureRegistry, IdentifierStore, SetName};
use std::sync::Arc;

/// Answers policy questions without being able to change anything.
#[derive(Clone)]
pub struct PolicyView {
    store: IdentifierStore,
    features: Arc<FeatureRegistry>,
    baselines: Arc<BaselineBook>,
}

impl PolicyView {
    pub(crate) fn new(
        store: IdentifierStore,
        features: Arc<FeatureRegistry>,
        baselines: Arc<BaselineBook>,
    ) -> Self {
        Self {
            store,
            features,
            baselines,
        }
    }

    /// Whether `id` is on the deny-list.
    pub async fn is_deny_listed(&self, id: &Snowflake) -> GuardResult<bool> {
        self.store.contains(SetName::DenyList, id).await
    }

    /// Whether `id` is on the allow-list.
    pub async fn is_allow_listed(&self, id: &Snowflake) -> GuardResult<bool> {
        self.store.contains(SetName::AllowList, id).await
    }

    /// Whether the rule for `capability` is switched on.
    pub fn is_feature_enabled(&self, capability: Capability) -> bool {
        self.features.is_enabled(capability)
    }

    /// Last accepted state of `role` in `guild`.
    pub fn role_baseline(&self, guild: &Snowflake, role: &Snowflake) -> Option<RoleBaseline> {
        self.baselines.get(guild, role)
    }
}
