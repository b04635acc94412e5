//! Stripe billing over its form-encoded REST API

use super::{BillingProvider, CheckoutRequest, CheckoutSession, PortalSession};
use crate::error::{Result, SageError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info};

pub const DEFAULT_BASE_URL: &str = "https://api.stripe.com/v1";

pub struct StripeBilling {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PortalSessionResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl StripeBilling {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: &[(&str, &str)]) -> Result<T> {
        debug!("Stripe: POST {}", path);

        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message.or(b.error.kind))
                .unwrap_or(body);
            error!("Stripe {} failed with status {}: {}", path, status, message);
            return Err(SageError::Provider(format!("billing request failed: {}", message)));
        }

        Ok(response.json().await?)
    }
}

/// Form fields of a one-seat subscription checkout
pub fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, &str)> {
    vec![
        ("mode", "subscription"),
        ("payment_method_types[0]", "card"),
        ("line_items[0][price]", request.price_id.as_str()),
        ("line_items[0][quantity]", "1"),
        ("success_url", request.success_url.as_str()),
        ("cancel_url", request.cancel_url.as_str()),
        ("client_reference_id", request.user_id.as_str()),
    ]
}

#[async_trait]
impl BillingProvider for StripeBilling {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        let session: CheckoutSessionResponse = self
            .post_form("checkout/sessions", &checkout_form(request))
            .await?;

        info!("Created checkout session {} for user {}", session.id, request.user_id);
        Ok(CheckoutSession {
            session_id: session.id,
            url: session.url,
        })
    }

    async fn create_portal_session(&self, customer_id: &str, return_url: &str) -> Result<PortalSession> {
        let session: PortalSessionResponse = self
            .post_form(
                "billing_portal/sessions",
                &[("customer", customer_id), ("return_url", return_url)],
            )
            .await?;

        Ok(PortalSession { url: session.url })
    }

    fn provider_name(&self) -> &str {
        "stripe"
    }
}
