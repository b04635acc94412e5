//! Integration tests for the SQLite store

use chrono::{Duration, TimeZone, Utc};
use sage_api::config::DashboardConfig;
use sage_api::dashboard::DashboardService;
use sage_api::models::{AccountRecord, ReplyRecord, Subscription, TemplateRecord};
use sage_api::store::{DataStore, SqliteStore};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

/// Helper to create an in-memory database for testing
async fn setup_store() -> SqliteStore {
    // One connection: every pooled connection would otherwise open its own
    // empty in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let store = SqliteStore::new(pool);
    store.init_db().await.unwrap();
    store
}

fn account(id: &str, days_ago: i64, status: Option<&str>) -> AccountRecord {
    AccountRecord {
        id: id.to_string(),
        email: Some(format!("{}@example.com", id)),
        created_at: Some(Utc::now() - Duration::days(days_ago)),
        last_sign_in_at: Some(Utc::now() - Duration::days(days_ago / 2)),
        subscription_status: status.map(str::to_string),
    }
}

#[tokio::test]
async fn test_empty_tables() {
    let store = setup_store().await;

    assert!(store.accounts().await.unwrap().is_empty());
    assert!(store.replies().await.unwrap().is_empty());
    assert!(store.templates().await.unwrap().is_empty());
    assert!(store.subscription("nobody").await.unwrap().is_none());
    assert_eq!(store.backend_name(), "sqlite");
}

#[tokio::test]
async fn test_accounts_newest_first() {
    let store = setup_store().await;

    store.insert_account(&account("old", 40, Some("active"))).await.unwrap();
    store.insert_account(&account("new", 1, None)).await.unwrap();
    store.insert_account(&account("mid", 10, Some("trial"))).await.unwrap();

    let accounts = store.accounts().await.unwrap();
    let ids: Vec<&str> = accounts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);
    assert_eq!(accounts[2].subscription_status.as_deref(), Some("active"));
    assert!(accounts[0].subscription_status.is_none());
    assert!(accounts[0].last_sign_in_at.is_some());
}

#[tokio::test]
async fn test_timestamps_round_trip() {
    let store = setup_store().await;
    let created = Utc.with_ymd_and_hms(2025, 4, 2, 8, 15, 30).unwrap();

    store
        .insert_reply(&ReplyRecord {
            id: "r1".to_string(),
            user_id: Some("u1".to_string()),
            created_at: Some(created),
        })
        .await
        .unwrap();

    let replies = store.replies().await.unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].created_at, Some(created));
    assert_eq!(replies[0].user_id.as_deref(), Some("u1"));
}

#[tokio::test]
async fn test_templates_most_used_first() {
    let store = setup_store().await;

    for (id, usage) in [("a", 3), ("b", 42), ("c", 7)] {
        store
            .insert_template(&TemplateRecord {
                id: id.to_string(),
                name: Some(format!("Template {}", id)),
                usage_count: Some(usage),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let templates = store.templates().await.unwrap();
    let usage: Vec<i64> = templates.iter().filter_map(|t| t.usage_count).collect();
    assert_eq!(usage, vec![42, 7, 3]);
}

#[tokio::test]
async fn test_subscription_upsert() {
    let store = setup_store().await;
    let mut subscription = Subscription {
        user_id: "u1".to_string(),
        status: Some("trial".to_string()),
        plan_id: Some("pro".to_string()),
        stripe_customer_id: Some("cus_1".to_string()),
        ..Default::default()
    };

    store.upsert_subscription(&subscription).await.unwrap();
    subscription.status = Some("active".to_string());
    store.upsert_subscription(&subscription).await.unwrap();

    let found = store.subscription("u1").await.unwrap().unwrap();
    assert_eq!(found, subscription);
}

#[tokio::test]
async fn test_dashboard_over_sqlite() {
    let store = setup_store().await;

    store.insert_account(&account("a", 2, Some("active"))).await.unwrap();
    store.insert_account(&account("b", 3, Some("free"))).await.unwrap();
    for i in 0..6 {
        store
            .insert_reply(&ReplyRecord {
                id: format!("r{}", i),
                user_id: Some("a".to_string()),
                created_at: Some(Utc::now()),
            })
            .await
            .unwrap();
    }

    let service = DashboardService::new(Arc::new(store), DashboardConfig::default());
    let snapshot = service.compute_snapshot().await;

    assert_eq!(snapshot.metrics.total_accounts, 2);
    assert_eq!(snapshot.metrics.active_accounts, 2);
    assert_eq!(snapshot.metrics.total_replies, 6);
    assert!((snapshot.metrics.avg_replies_per_account - 3.0).abs() < 1e-9);
    assert_eq!(snapshot.time_series.len(), 30);

    let replies_today = snapshot.time_series.last().map(|p| p.reply_count);
    assert_eq!(replies_today, Some(6));
}
