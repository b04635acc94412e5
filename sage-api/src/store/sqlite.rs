//! SQLite-backed store for local development
//!
//! Mirrors the hosted schema closely enough for the dashboard queries.
//! Timestamps are stored as RFC 3339 text.

use super::DataStore;
use crate::error::Result;
use crate::models::{parse_timestamp, AccountRecord, ReplyRecord, Subscription, TemplateRecord};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the tables exist
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = database_url
            .parse::<sqlx::sqlite::SqliteConnectOptions>()?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        let store = Self::new(pool);
        store.init_db().await?;
        info!("SQLite store ready at {}", database_url);
        Ok(store)
    }

    /// Create the tables if they do not exist
    pub async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT,
                created_at TEXT,
                last_sign_in_at TEXT,
                subscription_status TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS replies (
                id TEXT PRIMARY KEY,
                user_id TEXT,
                created_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS templates (
                id TEXT PRIMARY KEY,
                name TEXT,
                usage_count INTEGER,
                created_at TEXT,
                updated_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_subscriptions (
                user_id TEXT PRIMARY KEY,
                status TEXT,
                plan_id TEXT,
                stripe_customer_id TEXT,
                stripe_subscription_id TEXT,
                current_period_end TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_replies_user ON replies(user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn insert_account(&self, account: &AccountRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO users (id, email, created_at, last_sign_in_at, subscription_status)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(account.created_at.map(|ts| ts.to_rfc3339()))
        .bind(account.last_sign_in_at.map(|ts| ts.to_rfc3339()))
        .bind(&account.subscription_status)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_reply(&self, reply: &ReplyRecord) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO replies (id, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&reply.id)
            .bind(&reply.user_id)
            .bind(reply.created_at.map(|ts| ts.to_rfc3339()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_template(&self, template: &TemplateRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO templates (id, name, usage_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&template.id)
        .bind(&template.name)
        .bind(template.usage_count)
        .bind(template.created_at.map(|ts| ts.to_rfc3339()))
        .bind(template.updated_at.map(|ts| ts.to_rfc3339()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_subscription(&self, subscription: &Subscription) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO user_subscriptions
            (user_id, status, plan_id, stripe_customer_id, stripe_subscription_id, current_period_end)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subscription.user_id)
        .bind(&subscription.status)
        .bind(&subscription.plan_id)
        .bind(&subscription.stripe_customer_id)
        .bind(&subscription.stripe_subscription_id)
        .bind(subscription.current_period_end.map(|ts| ts.to_rfc3339()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn timestamp(row: &SqliteRow, column: &str) -> Option<DateTime<Utc>> {
    row.get::<Option<String>, _>(column)
        .as_deref()
        .and_then(parse_timestamp)
}

#[async_trait::async_trait]
impl DataStore for SqliteStore {
    async fn accounts(&self) -> Result<Vec<AccountRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, created_at, last_sign_in_at, subscription_status
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let accounts: Vec<AccountRecord> = rows
            .iter()
            .map(|row| AccountRecord {
                id: row.get("id"),
                email: row.get("email"),
                created_at: timestamp(row, "created_at"),
                last_sign_in_at: timestamp(row, "last_sign_in_at"),
                subscription_status: row.get("subscription_status"),
            })
            .collect();

        debug!("SqliteStore: loaded {} accounts", accounts.len());
        Ok(accounts)
    }

    async fn replies(&self) -> Result<Vec<ReplyRecord>> {
        let rows = sqlx::query("SELECT id, user_id, created_at FROM replies ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| ReplyRecord {
                id: row.get("id"),
                user_id: row.get("user_id"),
                created_at: timestamp(row, "created_at"),
            })
            .collect())
    }

    async fn templates(&self) -> Result<Vec<TemplateRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, usage_count, created_at, updated_at
            FROM templates
            ORDER BY usage_count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| TemplateRecord {
                id: row.get("id"),
                name: row.get("name"),
                usage_count: row.get("usage_count"),
                created_at: timestamp(row, "created_at"),
                updated_at: timestamp(row, "updated_at"),
            })
            .collect())
    }

    async fn subscription(&self, user_id: &str) -> Result<Option<Subscription>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, status, plan_id, stripe_customer_id, stripe_subscription_id, current_period_end
            FROM user_subscriptions
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Subscription {
            user_id: row.get("user_id"),
            status: row.get("status"),
            plan_id: row.get("plan_id"),
            stripe_customer_id: row.get("stripe_customer_id"),
            stripe_subscription_id: row.get("stripe_subscription_id"),
            current_period_end: timestamp(&row, "current_period_end"),
        }))
    }

    fn backend_name(&self) -> &str {
        "sqlite"
    }
}
