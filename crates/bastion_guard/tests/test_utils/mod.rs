//! Shared fixtures for enforcement tests.

#![allow(dead_code)]

pub mod mock_gateway;

pub use mock_gateway::{Call, GUILD, LOG_CHANNEL, MockGateway, OPERATOR, OWNER, id};

use bastion_guard::{EnforcementEngine, EngineSettingsBuilder};
use bastion_store::{FeatureRegistry, IdentifierStore, SetName, StoreLayout};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Engine wired to a mock gateway and a throwaway data directory.
pub struct Harness {
    pub dir: TempDir,
    pub gateway: Arc<MockGateway>,
    pub store: IdentifierStore,
    pub features: Arc<FeatureRegistry>,
    pub engine: EnforcementEngine,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_gateway(MockGateway::new()).await
    }

    pub async fn with_gateway(gateway: MockGateway) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let layout = StoreLayout::in_dir(dir.path());
        let store = IdentifierStore::new(layout.clone());
        let features = Arc::new(
            FeatureRegistry::open(layout.features_path())
                .await
                .expect("feature registry"),
        );
        let gateway = Arc::new(gateway);
        let settings = EngineSettingsBuilder::default()
            .ban_retry_delay(Duration::from_millis(10))
            .reinvite_url("https://discord.gg/rejoin")
            .build()
            .expect("settings");
        let engine = EnforcementEngine::new(
            gateway.clone(),
            store.clone(),
            Arc::clone(&features),
            settings,
        );
        Self {
            dir,
            gateway,
            store,
            features,
            engine,
        }
    }

    pub async fn deny_listed(&self) -> Vec<String> {
        self.set(SetName::DenyList).await
    }

    pub async fn allow(&self, raw: &str) {
        self.store
            .add(SetName::AllowList, [raw])
            .await
            .expect("allow-list write");
    }

    async fn set(&self, set: SetName) -> Vec<String> {
        self.store
            .load(set)
            .await
            .expect("set load")
            .iter()
            .map(|id| id.to_string())
            .collect()
    }
}
