//! GoTrue (Supabase Auth) client

use super::{AuthProvider, AuthSession, AuthUser, Credentials};
use crate::error::{Result, SageError};
use async_trait::async_trait;
use reqwest::Response;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub struct GoTrueAuth {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
}

impl GoTrueAuth {
    /// `project_url` is the project root; endpoints live under `/auth/v1`
    pub fn new(project_url: &str, anon_key: String) -> Self {
        Self {
            base_url: format!("{}/auth/v1", project_url.trim_end_matches('/')),
            anon_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.endpoint(path))
            .header("apikey", &self.anon_key)
    }
}

/// Pull the human-readable message out of a GoTrue error body
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Map a non-success response: client errors are rejections the caller sees
async fn reject(response: Response) -> SageError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    if status.is_client_error() {
        debug!("Auth provider rejected request ({}): {}", status, message);
        SageError::AuthRejected(message)
    } else {
        warn!("Auth provider failed with status {}: {}", status, message);
        SageError::Provider(format!("auth provider error: {} - {}", status, message))
    }
}

/// Sign-up answers with the user, or with a session wrapping it when
/// confirmation is disabled
pub fn user_from_signup(body: Value) -> Result<AuthUser> {
    let user = match body.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ => body,
    };
    Ok(serde_json::from_value(user)?)
}

#[async_trait]
impl AuthProvider for GoTrueAuth {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession> {
        let response = self
            .post("token?grant_type=password")
            .json(&json!({ "email": credentials.email, "password": credentials.password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }
        Ok(response.json().await?)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser> {
        let response = self
            .post("signup")
            .json(&json!({ "email": credentials.email, "password": credentials.password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }
        user_from_signup(response.json().await?)
    }

    async fn sign_out(&self, access_token: Option<&str>) -> Result<()> {
        let Some(token) = access_token else {
            debug!("Sign-out without a session token");
            return Ok(());
        };

        let response = self.post("logout").bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(reject(response).await);
        }
        Ok(())
    }
}
