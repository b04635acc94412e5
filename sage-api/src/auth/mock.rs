//! In-memory auth provider for development and tests

use super::{AuthProvider, AuthSession, AuthUser, Credentials};
use crate::error::{Result, SageError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

struct StoredUser {
    password: String,
    user: AuthUser,
}

#[derive(Default)]
pub struct MockAuth {
    users: Mutex<HashMap<String, StoredUser>>,
    sessions: Mutex<Vec<String>>,
    unavailable: bool,
}

impl MockAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register a user
    pub fn with_user(self, email: &str, password: &str) -> Self {
        if let Ok(mut users) = self.users.lock() {
            users.insert(email.to_string(), stored(email, password));
        }
        self
    }

    /// Every call fails as if the provider could not be reached
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    fn check(&self) -> Result<()> {
        if self.unavailable {
            return Err(SageError::Provider("auth provider unreachable".to_string()));
        }
        Ok(())
    }

    fn lock_users(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, StoredUser>>> {
        self.users
            .lock()
            .map_err(|_| SageError::Provider("auth state poisoned".to_string()))
    }
}

fn stored(email: &str, password: &str) -> StoredUser {
    StoredUser {
        password: password.to_string(),
        user: AuthUser {
            id: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
            created_at: Some(Utc::now().to_rfc3339()),
            last_sign_in_at: None,
        },
    }
}

#[async_trait]
impl AuthProvider for MockAuth {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession> {
        self.check()?;
        let user = {
            let mut users = self.lock_users()?;
            match users.get_mut(&credentials.email) {
                Some(stored) if stored.password == credentials.password => {
                    stored.user.last_sign_in_at = Some(Utc::now().to_rfc3339());
                    stored.user.clone()
                }
                _ => return Err(SageError::AuthRejected("Invalid login credentials".to_string())),
            }
        };

        let token = Uuid::new_v4().to_string();
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.push(token.clone());
        }

        Ok(AuthSession {
            access_token: token,
            refresh_token: None,
            expires_in: Some(3600),
            user,
        })
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser> {
        self.check()?;
        let mut users = self.lock_users()?;
        if users.contains_key(&credentials.email) {
            return Err(SageError::AuthRejected("User already registered".to_string()));
        }

        let entry = stored(&credentials.email, &credentials.password);
        let user = entry.user.clone();
        users.insert(credentials.email.clone(), entry);
        Ok(user)
    }

    async fn sign_out(&self, access_token: Option<&str>) -> Result<()> {
        self.check()?;
        if let (Some(token), Ok(mut sessions)) = (access_token, self.sessions.lock()) {
            sessions.retain(|s| s != token);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let auth = MockAuth::new();
        let creds = Credentials::new("ada@example.com", "hunter22");

        let user = auth.sign_up(&creds).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));

        let session = auth.sign_in(&creds).await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(auth.active_sessions(), 1);

        auth.sign_out(Some(&session.access_token)).await.unwrap();
        assert_eq!(auth.active_sessions(), 0);
    }

    #[tokio::test]
    async fn test_rejections() {
        let auth = MockAuth::new().with_user("ada@example.com", "right");

        let err = auth
            .sign_in(&Credentials::new("ada@example.com", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");

        let err = auth
            .sign_up(&Credentials::new("ada@example.com", "other"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User already registered");
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_unavailable() {
        let auth = MockAuth::unavailable();
        let err = auth.sign_out(None).await.unwrap_err();
        assert!(!err.is_client_error());
    }
}
