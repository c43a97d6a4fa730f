//! Tests for feature flags, the incentive ledger and the seen-member log.

use bastion_core::{Capability, Snowflake};
use bastion_store::{FeatureRegistry, IncentiveLedger, SeenMembers};
use tempfile::TempDir;

#[tokio::test]
async fn test_missing_feature_file_persists_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("features.json");

    let registry = FeatureRegistry::open(&path).await.unwrap();

    assert!(registry.is_enabled(Capability::Ban));
    assert!(path.exists());
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["roleDelete"], serde_json::Value::Bool(true));
}

#[tokio::test]
async fn test_corrupt_feature_file_is_replaced() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("features.json");
    std::fs::write(&path, "{ not json").unwrap();

    let registry = FeatureRegistry::open(&path).await.unwrap();

    assert!(registry.is_enabled(Capability::Kick));
    let reparsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(reparsed.is_object());
}

#[tokio::test]
async fn test_toggle_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("features.json");

    let registry = FeatureRegistry::open(&path).await.unwrap();
    registry.set(Capability::RoleUpdate, false).await.unwrap();
    registry
        .set_many(&[Capability::Kick, Capability::Channel], false)
        .await
        .unwrap();

    let reopened = FeatureRegistry::open(&path).await.unwrap();
    assert!(!reopened.is_enabled(Capability::RoleUpdate));
    assert!(!reopened.is_enabled(Capability::Kick));
    assert!(!reopened.is_enabled(Capability::Channel));
    assert!(reopened.is_enabled(Capability::Ban));
}

#[tokio::test]
async fn test_ledger_set_total_keeps_current() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = IncentiveLedger::new(temp_dir.path().join("profit.txt"));
    let id = Snowflake::parse("123456789").unwrap();

    ledger.add(&id, 25.0).await.unwrap();
    let record = ledger.set_total(&id, 100.0).await.unwrap();

    assert_eq!(record.current, 25.0);
    assert_eq!(record.total, 100.0);
    let msgs: Vec<&str> = record.logs.iter().map(|l| l.msg.as_str()).collect();
    assert_eq!(
        msgs,
        [
            "Profit set to $25.00",
            "Profit set to $100.00",
            "Total profit set to $100.00"
        ]
    );
}

#[tokio::test]
async fn test_ledger_reset_and_lookup() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = IncentiveLedger::new(temp_dir.path().join("profit.txt"));
    let id = Snowflake::parse("123456789").unwrap();
    let stranger = Snowflake::parse("987654321").unwrap();

    ledger.add(&id, 10.0).await.unwrap();
    ledger.add(&id, 5.5).await.unwrap();
    assert_eq!(ledger.record(&id).await.unwrap().current, 15.5);

    let reset = ledger.reset(&id).await.unwrap();
    assert_eq!(reset.current, 0.0);
    assert_eq!(reset.logs.len(), 1);
    assert_eq!(reset.logs[0].msg, "Profile reset");

    assert_eq!(ledger.record(&stranger).await.unwrap().current, 0.0);
}

#[tokio::test]
async fn test_ledger_reads_legacy_format() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("profit.txt");
    std::fs::write(&path, "123456789 12 40 | legacy\n").unwrap();
    let ledger = IncentiveLedger::new(&path);
    let id = Snowflake::parse("123456789").unwrap();

    let record = ledger.add(&id, 3.0).await.unwrap();
    assert_eq!(record.current, 15.0);
    assert_eq!(record.total, 40.0);

    // Rewritten as JSON on first mutation
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok());
}

#[tokio::test]
async fn test_seen_members_dedupe_on_append() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("user_ids.txt");
    std::fs::write(&path, "111111").unwrap();
    let seen = SeenMembers::new(&path);

    let ids = ["111111", "222222", "222222"].map(|s| Snowflake::parse(s).unwrap());
    assert_eq!(seen.record(ids).await.unwrap(), 1);
    assert_eq!(
        seen.record([Snowflake::parse("222222").unwrap()]).await.unwrap(),
        0
    );

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "111111\n222222\n");
}
