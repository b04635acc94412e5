//! Subscription billing
//!
//! The payment provider is reached through [`BillingProvider`]; handlers only
//! see checkout and portal sessions.

pub mod mock;
pub mod plans;
pub mod stripe;

use crate::error::Result;
use crate::models::Subscription;
use crate::store::DataStore;
use async_trait::async_trait;
use serde::Serialize;
use tracing::error;

pub use mock::MockBilling;
pub use plans::{plan_by_id, PlanListing, PricingPlan, PRICING_PLANS};
pub use stripe::StripeBilling;

/// Parameters of a hosted checkout
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub price_id: String,
    pub user_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortalSession {
    pub url: String,
}

#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Start a subscription checkout for one seat of `price_id`
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession>;

    /// Open the self-service billing portal for an existing customer
    async fn create_portal_session(&self, customer_id: &str, return_url: &str) -> Result<PortalSession>;

    fn provider_name(&self) -> &str;
}

/// Look up a user's subscription; read errors are logged and reported as none
pub async fn user_subscription(store: &dyn DataStore, user_id: &str) -> Option<Subscription> {
    match store.subscription(user_id).await {
        Ok(subscription) => subscription,
        Err(e) => {
            error!("Error getting user subscription for {}: {}", user_id, e);
            None
        }
    }
}
