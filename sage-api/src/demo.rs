//! Demo data for the local SQLite store

use crate::error::Result;
use crate::models::{AccountRecord, ReplyRecord, Subscription, TemplateRecord};
use crate::store::SqliteStore;
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

const TEMPLATE_NAMES: &[&str] = &[
    "Meeting reschedule",
    "Invoice follow-up",
    "Support acknowledgement",
    "Partnership inquiry",
    "Out of office",
    "Thank you note",
    "Interview scheduling",
    "Refund request",
];

const STATUSES: &[&str] = &["active", "trial", "free", "canceled"];

#[derive(Debug, Default)]
pub struct DemoData {
    pub accounts: Vec<AccountRecord>,
    pub replies: Vec<ReplyRecord>,
    pub templates: Vec<TemplateRecord>,
    pub subscriptions: Vec<Subscription>,
}

/// Generate `account_count` accounts spread over the last 60 days, each with
/// a handful of replies
pub fn generate<R: Rng>(account_count: usize, now: DateTime<Utc>, rng: &mut R) -> DemoData {
    let mut data = DemoData::default();

    for i in 0..account_count {
        let id = Uuid::new_v4().to_string();
        let created_at = now - Duration::minutes(rng.gen_range(0..60 * 24 * 60));
        let status = STATUSES.choose(rng).copied().unwrap_or("free");
        let last_sign_in_at = rng
            .gen_bool(0.7)
            .then(|| now - Duration::hours(rng.gen_range(0..24 * 45)));

        for _ in 0..rng.gen_range(0..12) {
            let age = (now - created_at).num_minutes().max(1);
            data.replies.push(ReplyRecord {
                id: Uuid::new_v4().to_string(),
                user_id: Some(id.clone()),
                created_at: Some(now - Duration::minutes(rng.gen_range(0..age))),
            });
        }

        if status == "active" || status == "trial" {
            data.subscriptions.push(Subscription {
                user_id: id.clone(),
                status: Some(status.to_string()),
                plan_id: Some(if rng.gen_bool(0.8) { "pro" } else { "enterprise" }.to_string()),
                stripe_customer_id: Some(format!("cus_demo{:04}", i)),
                stripe_subscription_id: Some(format!("sub_demo{:04}", i)),
                current_period_end: Some(now + Duration::days(rng.gen_range(1..31))),
            });
        }

        data.accounts.push(AccountRecord {
            id,
            email: Some(format!("user{}@example.com", i + 1)),
            created_at: Some(created_at),
            last_sign_in_at,
            subscription_status: Some(status.to_string()),
        });
    }

    for name in TEMPLATE_NAMES {
        let created_at = now - Duration::days(rng.gen_range(10..90));
        data.templates.push(TemplateRecord {
            id: Uuid::new_v4().to_string(),
            name: Some(name.to_string()),
            usage_count: Some(rng.gen_range(0..500)),
            created_at: Some(created_at),
            updated_at: rng.gen_bool(0.5).then(|| now - Duration::days(rng.gen_range(0..10))),
        });
    }

    data
}

/// Write generated records into the store
pub async fn seed(store: &SqliteStore, data: &DemoData) -> Result<()> {
    for account in &data.accounts {
        store.insert_account(account).await?;
    }
    for reply in &data.replies {
        store.insert_reply(reply).await?;
    }
    for template in &data.templates {
        store.insert_template(template).await?;
    }
    for subscription in &data.subscriptions {
        store.upsert_subscription(subscription).await?;
    }

    info!(
        "Seeded {} accounts, {} replies, {} templates, {} subscriptions",
        data.accounts.len(),
        data.replies.len(),
        data.templates.len(),
        data.subscriptions.len()
    );
    Ok(())
}
