//! Hosted authentication
//!
//! Sign-in, sign-up and sign-out are delegated to an [`AuthProvider`].
//! Provider refusals surface as [`SageError::AuthRejected`](crate::error::SageError::AuthRejected)
//! so the API can return them to the caller verbatim.

pub mod gotrue;
pub mod mock;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gotrue::GoTrueAuth;
pub use mock::MockAuth;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

/// User as reported by the auth provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_sign_in_at: Option<String>,
}

/// Tokens issued on sign-in
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession>;

    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser>;

    /// End the session identified by `access_token`; without a token there
    /// is nothing to revoke
    async fn sign_out(&self, access_token: Option<&str>) -> Result<()>;
}
