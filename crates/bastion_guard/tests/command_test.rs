//! Operator command tests.

mod test_utils;

use bastion_core::Capability;
use bastion_guard::{OperatorConsole, OwnCapabilities, VIEW_CHUNK};
use bastion_store::{IncentiveLedger, SetName};
use test_utils::{GUILD, Harness, id};

const ADMIN: &str = "700000000001";
const STRANGER: &str = "700000000002";
const MEMBER: &str = "123456789012";

async fn console(h: &Harness) -> OperatorConsole {
    h.store.add(SetName::Operators, [ADMIN]).await.unwrap();
    OperatorConsole::new(
        h.gateway.clone(),
        h.store.clone(),
        h.features.clone(),
        IncentiveLedger::new(h.store.layout().ledger_path()),
    )
}

#[tokio::test]
async fn test_non_operators_are_ignored() {
    let h = Harness::new().await;
    let console = console(&h).await;

    let replies = console
        .handle(&id(GUILD), &id(STRANGER), &format!("+blacklist <@{MEMBER}>"))
        .await
        .unwrap();

    assert!(replies.is_empty());
    assert!(h.deny_listed().await.is_empty());
}

#[tokio::test]
async fn test_list_edits_persist() {
    let h = Harness::new().await;
    let console = console(&h).await;
    let guild = id(GUILD);
    let admin = id(ADMIN);

    let replies = console
        .handle(&guild, &admin, &format!("+whitelist <@{MEMBER}>"))
        .await
        .unwrap();
    assert_eq!(replies[0].title(), "✅ Whitelisted");
    assert!(h.store.contains_str(SetName::AllowList, MEMBER).await.unwrap());

    console
        .handle(&guild, &admin, &format!("+unwhitelist {MEMBER}"))
        .await
        .unwrap();
    assert!(!h.store.contains_str(SetName::AllowList, MEMBER).await.unwrap());

    console
        .handle(&guild, &admin, &format!("+blacklist <@!{MEMBER}>"))
        .await
        .unwrap();
    assert_eq!(h.deny_listed().await, vec![MEMBER]);
}

#[tokio::test]
async fn test_list_edits_need_ban_and_audit_permissions() {
    let h = Harness::new().await;
    h.gateway.set_capabilities(OwnCapabilities {
        view_audit_log: false,
        ..OwnCapabilities::all()
    });
    let console = console(&h).await;

    let replies = console
        .handle(&id(GUILD), &id(ADMIN), &format!("+blacklist {MEMBER}"))
        .await
        .unwrap();

    assert_eq!(replies[0].title(), "❌ Missing Permissions");
    assert!(h.deny_listed().await.is_empty());
}

#[tokio::test]
async fn test_bad_arguments_get_usage_reply() {
    let h = Harness::new().await;
    let console = console(&h).await;

    let replies = console
        .handle(&id(GUILD), &id(ADMIN), "+whitelist someone")
        .await
        .unwrap();

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].title(), "Usage");
    assert!(replies[0].description().contains("+unwhitelist"));
}

#[tokio::test]
async fn test_view_is_chunked() {
    let h = Harness::new().await;
    let ids: Vec<String> = (0..120).map(|n| format!("{}", 800000000000u64 + n)).collect();
    h.store.add(SetName::DenyList, &ids).await.unwrap();
    let console = console(&h).await;

    let replies = console
        .handle(&id(GUILD), &id(ADMIN), "+view blacklist")
        .await
        .unwrap();

    assert_eq!(replies.len(), 120usize.div_ceil(VIEW_CHUNK));
    assert_eq!(replies[0].title(), "📄 Blacklist (120)");
    assert_eq!(replies[1].title(), "📄 Blacklist (cont.)");
    assert_eq!(replies[2].description().lines().count(), 20);
}

#[tokio::test]
async fn test_view_of_empty_list() {
    let h = Harness::new().await;
    let console = console(&h).await;

    let replies = console
        .handle(&id(GUILD), &id(ADMIN), "+view whitelist")
        .await
        .unwrap();

    assert_eq!(replies.len(), 1);
    assert!(replies[0].description().contains("currently empty"));
}

#[tokio::test]
async fn test_toggle_reports_unknown_names() {
    let h = Harness::new().await;
    let console = console(&h).await;

    let replies = console
        .handle(&id(GUILD), &id(ADMIN), "+disable bans,rd nonsense")
        .await
        .unwrap();

    assert!(!h.features.is_enabled(Capability::Ban));
    assert!(!h.features.is_enabled(Capability::RoleDelete));
    assert!(h.features.is_enabled(Capability::Kick));
    let body = replies[0].description();
    assert!(body.contains("Updated **2** feature(s)"));
    assert!(body.contains("`nonsense`"));
}

#[tokio::test]
async fn test_profit_commands() {
    let h = Harness::new().await;
    let console = console(&h).await;
    let guild = id(GUILD);
    let admin = id(ADMIN);

    console
        .handle(&guild, &admin, &format!("+addprofit <@{MEMBER}> $25"))
        .await
        .unwrap();
    let replies = console
        .handle(&guild, &admin, &format!("+tprofit <@{MEMBER}> 1,000"))
        .await
        .unwrap();
    let body = replies[0].description();
    assert!(body.contains("**Profit:** $25.00"));
    assert!(body.contains("**Total Profit:** $1000.00"));

    let replies = console
        .handle(&guild, &admin, &format!("+reset <@{MEMBER}>"))
        .await
        .unwrap();
    assert_eq!(replies[0].title(), "🔄 Profit Reset");

    let replies = console
        .handle(&guild, &admin, &format!("+search <@{MEMBER}>"))
        .await
        .unwrap();
    let body = replies[0].description();
    assert!(body.contains("**Profit:** $0.00"));
    assert!(body.contains("Profile reset"));
}

#[tokio::test]
async fn test_policy_view_reflects_store() {
    let h = Harness::new().await;
    h.store.add(SetName::DenyList, [MEMBER]).await.unwrap();
    h.features.set(Capability::Kick, false).await.unwrap();
    let policy = h.engine.policy();

    assert!(policy.is_deny_listed(&id(MEMBER)).await.unwrap());
    assert!(!policy.is_allow_listed(&id(MEMBER)).await.unwrap());
    assert!(!policy.is_feature_enabled(Capability::Kick));
    assert!(policy.role_baseline(&id(GUILD), &id(MEMBER)).is_none());
}
