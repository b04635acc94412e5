//! Record shapes read from the hosted data store
//!
//! Rows come back with optional columns; the formatted types used in API
//! responses fill the gaps with fixed defaults.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Email used when an account row has none
pub const UNKNOWN_EMAIL: &str = "unknown@example.com";

/// Name used when a template row has none
pub const UNTITLED_TEMPLATE: &str = "Untitled Template";

/// Subscription status of an account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Free,
    Trial,
    Active,
    Canceled,
}

impl SubscriptionStatus {
    pub const ALL: [SubscriptionStatus; 4] = [
        SubscriptionStatus::Active,
        SubscriptionStatus::Trial,
        SubscriptionStatus::Free,
        SubscriptionStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Free => "free",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
        }
    }

    /// Parse a stored status; anything unrecognised counts as free
    pub fn from_db_string(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "trial" | "trialing" => SubscriptionStatus::Trial,
            "active" => SubscriptionStatus::Active,
            "canceled" | "cancelled" => SubscriptionStatus::Canceled,
            _ => SubscriptionStatus::Free,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the `users` collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subscription_status: Option<String>,
}

impl AccountRecord {
    pub fn status(&self) -> SubscriptionStatus {
        self.subscription_status
            .as_deref()
            .map(SubscriptionStatus::from_db_string)
            .unwrap_or_default()
    }
}

/// Row of the `replies` collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplyRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Row of the `templates` collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub usage_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Row of the `user_subscriptions` collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub stripe_customer_id: Option<String>,
    #[serde(default)]
    pub stripe_subscription_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub current_period_end: Option<DateTime<Utc>>,
}

/// Account as exposed on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub subscription_status: SubscriptionStatus,
}

impl Account {
    pub fn from_record(record: &AccountRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: record.id.clone(),
            email: record
                .email
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
            created_at: record.created_at.unwrap_or(now),
            last_sign_in_at: record.last_sign_in_at,
            subscription_status: record.status(),
        }
    }
}

/// Template as exposed on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub usage_count: i64,
    pub last_used: DateTime<Utc>,
}

impl Template {
    pub fn from_record(record: &TemplateRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: record.id.clone(),
            name: record
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNTITLED_TEMPLATE.to_string()),
            usage_count: record.usage_count.unwrap_or(0),
            last_used: record.updated_at.or(record.created_at).unwrap_or(now),
        }
    }
}

/// Parse a stored timestamp: RFC 3339, or a naive timestamp taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f%#z"]
        .iter()
        .find_map(|fmt| {
            DateTime::parse_from_str(raw, fmt)
                .map(|ts| ts.with_timezone(&Utc))
                .ok()
                .or_else(|| NaiveDateTime::parse_from_str(raw, fmt).ok().map(|n| n.and_utc()))
        })
}

/// Deserialize a primary key that may be text (uuid) or an integer column
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Uint(n) => n.to_string(),
    })
}

/// Deserialize an optional timestamp, dropping values that do not parse
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
