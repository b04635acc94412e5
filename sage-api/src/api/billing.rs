//! Billing endpoints: plan catalog, checkout, portal and subscription lookup

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::handlers::{ApiError, AppState};
use crate::billing::{self, plan_by_id, CheckoutRequest, CheckoutSession, PortalSession, PRICING_PLANS};
use crate::models::Subscription;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalBody {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub return_url: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{} is required", name)))
}

/// GET /api/billing/plans
pub async fn list_plans() -> Json<Value> {
    let plans: Vec<_> = PRICING_PLANS.iter().map(|plan| plan.listing()).collect();
    Json(json!({ "plans": plans }))
}

/// POST /api/billing/checkout - Start a hosted checkout for a paid plan
pub async fn create_checkout(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CheckoutBody>, JsonRejection>,
) -> Result<Json<CheckoutSession>, ApiError> {
    let Json(body) = body?;
    let plan_id = required(body.plan_id, "planId")?;
    let user_id = required(body.user_id, "userId")?;
    let success_url = required(body.success_url, "successUrl")?;
    let cancel_url = required(body.cancel_url, "cancelUrl")?;

    let plan = plan_by_id(&plan_id)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown plan: {}", plan_id)))?;
    if plan.is_free() {
        return Err(ApiError::bad_request("The free plan does not require checkout"));
    }

    let request = CheckoutRequest {
        price_id: state.billing_config.price_id_for(plan.id).to_string(),
        user_id,
        success_url,
        cancel_url,
    };

    let session = state
        .billing
        .create_checkout_session(&request)
        .await
        .map_err(|e| {
            error!("Error creating checkout session: {}", e);
            ApiError::internal("Failed to create checkout session")
        })?;

    state.metrics.inc_checkouts();
    info!("Checkout for plan {} started by {}", plan.id, request.user_id);
    Ok(Json(session))
}

/// POST /api/billing/portal - Open the billing portal for a customer
pub async fn create_portal(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PortalBody>, JsonRejection>,
) -> Result<Json<PortalSession>, ApiError> {
    let Json(body) = body?;
    let customer_id = required(body.customer_id, "customerId")?;
    let return_url = required(body.return_url, "returnUrl")?;

    let session = state
        .billing
        .create_portal_session(&customer_id, &return_url)
        .await
        .map_err(|e| {
            error!("Error creating portal session: {}", e);
            ApiError::internal("Failed to create portal session")
        })?;

    Ok(Json(session))
}

/// GET /api/billing/subscription/:user_id - Subscription row, or null
pub async fn get_subscription(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<Option<Subscription>> {
    Json(billing::user_subscription(state.store.as_ref(), &user_id).await)
}
