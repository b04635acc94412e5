//! In-process billing provider for development and tests

use super::{BillingProvider, CheckoutRequest, CheckoutSession, PortalSession};
use crate::error::{Result, SageError};
use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MockBilling {
    checkouts: Mutex<Vec<CheckoutRequest>>,
    fail_with: Option<String>,
}

impl MockBilling {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a provider error carrying `message`
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Checkout requests received so far
    pub fn checkouts(&self) -> Vec<CheckoutRequest> {
        self.checkouts
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<()> {
        match &self.fail_with {
            Some(message) => Err(SageError::Provider(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BillingProvider for MockBilling {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        self.check()?;
        if let Ok(mut checkouts) = self.checkouts.lock() {
            checkouts.push(request.clone());
        }

        let session_id = format!("cs_test_{}", Uuid::new_v4().simple());
        Ok(CheckoutSession {
            url: Some(format!("https://checkout.example.com/pay/{}", session_id)),
            session_id,
        })
    }

    async fn create_portal_session(&self, customer_id: &str, return_url: &str) -> Result<PortalSession> {
        self.check()?;
        Ok(PortalSession {
            url: format!(
                "https://billing.example.com/session/{}?return_url={}",
                customer_id, return_url
            ),
        })
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_checkouts() {
        let billing = MockBilling::new();
        let request = CheckoutRequest {
            price_id: "pro".to_string(),
            user_id: "u1".to_string(),
            success_url: "https://a".to_string(),
            cancel_url: "https://b".to_string(),
        };

        let session = billing.create_checkout_session(&request).await.unwrap();
        assert!(session.session_id.starts_with("cs_test_"));
        assert!(session.url.unwrap().ends_with(&session.session_id));
        assert_eq!(billing.checkouts(), vec![request]);
    }

    #[tokio::test]
    async fn test_failing() {
        let billing = MockBilling::failing("card network down");
        assert!(billing.create_portal_session("cus_1", "https://a").await.is_err());
    }
}
