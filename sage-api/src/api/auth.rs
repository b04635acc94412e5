//! POST /api/auth - Sign in, sign up and sign out through the auth provider

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::handlers::{ApiError, AppState};
use crate::auth::Credentials;
use crate::error::SageError;

/// Request body, dispatched on its `action` field
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum AuthRequest {
    Signin(Credentials),
    Signup(Credentials),
    Signout,
}

/// Bearer token of the caller, if any
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn require_complete(credentials: &Credentials) -> Result<(), SageError> {
    if credentials.is_complete() {
        Ok(())
    } else {
        Err(SageError::Validation("Email and password are required".to_string()))
    }
}

pub async fn auth(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let request: AuthRequest =
        serde_json::from_value(body).map_err(|_| ApiError::bad_request("Invalid action"))?;

    state.metrics.inc_auth_attempts();
    let result = dispatch(&state, request, bearer_token(&headers)).await;
    if let Err(e) = &result {
        state.metrics.inc_auth_failures();
        if !e.is_client_error() {
            warn!("Auth provider error: {}", e);
        }
    }
    result.map(Json).map_err(ApiError::from)
}

async fn dispatch(
    state: &AppState,
    request: AuthRequest,
    token: Option<&str>,
) -> Result<Value, SageError> {
    match request {
        AuthRequest::Signin(credentials) => {
            require_complete(&credentials)?;
            let session = state.auth.sign_in(&credentials).await?;
            info!("User {} signed in", session.user.id);
            Ok(json!({ "user": session.user }))
        }
        AuthRequest::Signup(credentials) => {
            require_complete(&credentials)?;
            let user = state.auth.sign_up(&credentials).await?;
            info!("User {} signed up", user.id);
            Ok(json!({ "user": user }))
        }
        AuthRequest::Signout => {
            state.auth.sign_out(token).await?;
            Ok(json!({ "message": "Signed out successfully" }))
        }
    }
}
