//! Sales/usage dashboard aggregation
//!
//! A snapshot is recomputed from the store on every call. Each collection is
//! read independently; a failed read is logged and counted as empty so the
//! dashboard degrades instead of failing.

pub mod export;
pub mod series;

use crate::config::DashboardConfig;
use crate::models::{Account, AccountRecord, ReplyRecord, SubscriptionStatus, Template, TemplateRecord};
use crate::store::DataStore;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

pub use series::SeriesPoint;

/// Headline figures
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_accounts: u64,
    pub active_accounts: u64,
    pub total_revenue: f64,
    pub mrr: f64,
    pub total_replies: u64,
    pub avg_replies_per_account: f64,
    pub conversion_rate: f64,
    pub churn_rate: f64,
}

/// Share of accounts in one subscription status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: SubscriptionStatus,
    pub count: u64,
    pub percentage: f64,
}

/// Everything the dashboard page renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(rename = "stats")]
    pub metrics: DashboardMetrics,
    #[serde(rename = "chartData")]
    pub time_series: Vec<SeriesPoint>,
    #[serde(rename = "accounts")]
    pub top_accounts: Vec<Account>,
    #[serde(rename = "templates")]
    pub top_templates: Vec<Template>,
    pub subscription_breakdown: Vec<StatusShare>,
}

/// Raw collections as read from the store
#[derive(Debug, Default)]
pub struct Sources {
    pub accounts: Vec<AccountRecord>,
    pub replies: Vec<ReplyRecord>,
    pub templates: Vec<TemplateRecord>,
}

pub struct DashboardService {
    store: Arc<dyn DataStore>,
    config: DashboardConfig,
}

impl DashboardService {
    pub fn new(store: Arc<dyn DataStore>, config: DashboardConfig) -> Self {
        Self { store, config }
    }

    /// Read all three collections, substituting empty ones for failed reads
    pub async fn fetch_sources(&self) -> Sources {
        let (accounts, replies, templates) = tokio::join!(
            self.store.accounts(),
            self.store.replies(),
            self.store.templates(),
        );

        let backend = self.store.backend_name();
        Sources {
            accounts: accounts.unwrap_or_else(|e| {
                warn!("Error fetching accounts from {}: {}", backend, e);
                Vec::new()
            }),
            replies: replies.unwrap_or_else(|e| {
                warn!("Error fetching replies from {}: {}", backend, e);
                Vec::new()
            }),
            templates: templates.unwrap_or_else(|e| {
                warn!("Error fetching templates from {}: {}", backend, e);
                Vec::new()
            }),
        }
    }

    /// Compute a fresh snapshot
    pub async fn compute_snapshot(&self) -> Snapshot {
        let sources = self.fetch_sources().await;
        let mut rng = rand::thread_rng();
        build_snapshot(&sources, &self.config, Utc::now(), &mut rng)
    }
}

/// Pure aggregation over already-fetched collections
pub fn build_snapshot<R: Rng>(
    sources: &Sources,
    config: &DashboardConfig,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Snapshot {
    let metrics = compute_metrics(sources, config, now);

    let time_series = series::build(
        config.series_mode,
        &series::SeriesInput {
            accounts: &sources.accounts,
            replies: &sources.replies,
            mrr: metrics.mrr,
            price_per_account: config.price_per_account,
        },
        now,
        config.series_days,
        rng,
    );

    let mut top_accounts: Vec<Account> = sources
        .accounts
        .iter()
        .map(|record| Account::from_record(record, now))
        .collect();
    top_accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    top_accounts.truncate(config.top_n);

    let mut top_templates: Vec<Template> = sources
        .templates
        .iter()
        .map(|record| Template::from_record(record, now))
        .collect();
    top_templates.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
    top_templates.truncate(config.top_n);

    debug!(
        "Snapshot: {} accounts ({} active), {} replies, {} templates",
        metrics.total_accounts,
        metrics.active_accounts,
        metrics.total_replies,
        sources.templates.len()
    );

    Snapshot {
        subscription_breakdown: subscription_breakdown(&sources.accounts),
        metrics,
        time_series,
        top_accounts,
        top_templates,
    }
}

pub fn compute_metrics(sources: &Sources, config: &DashboardConfig, now: DateTime<Utc>) -> DashboardMetrics {
    let total_accounts = sources.accounts.len() as u64;
    let cutoff = now - Duration::days(config.active_window_days);
    let active_accounts = sources
        .accounts
        .iter()
        .filter(|a| a.last_sign_in_at.map(|ts| ts > cutoff).unwrap_or(false))
        .count() as u64;

    let total_replies = sources.replies.len() as u64;
    let avg_replies_per_account = if total_accounts > 0 {
        total_replies as f64 / total_accounts as f64
    } else {
        0.0
    };

    let mrr = total_accounts as f64 * config.price_per_account;

    DashboardMetrics {
        total_accounts,
        active_accounts,
        total_revenue: mrr * 12.0,
        mrr,
        total_replies,
        avg_replies_per_account,
        conversion_rate: config.conversion_rate,
        churn_rate: config.churn_rate,
    }
}

pub fn subscription_breakdown(accounts: &[AccountRecord]) -> Vec<StatusShare> {
    let total = accounts.len() as u64;

    SubscriptionStatus::ALL
        .iter()
        .map(|&status| {
            let count = accounts.iter().filter(|a| a.status() == status).count() as u64;
            let percentage = if total > 0 {
                count as f64 * 100.0 / total as f64
            } else {
                0.0
            };
            StatusShare {
                status,
                count,
                percentage,
            }
        })
        .collect()
}
