//! Shared API state, error mapping and the reply/health handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use sage_ai::reply::{ReplyError, ReplyGenerator, ReplyRequest, Tone};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::metrics::Metrics;
use crate::auth::AuthProvider;
use crate::billing::BillingProvider;
use crate::config::BillingConfig;
use crate::dashboard::DashboardService;
use crate::error::SageError;
use crate::store::DataStore;

/// Shared application state
pub struct AppState {
    /// Reply generation over the configured LLM
    pub replies: ReplyGenerator,
    /// Dashboard aggregation over `store`
    pub dashboard: DashboardService,
    /// Record store (accounts, replies, templates, subscriptions)
    pub store: Arc<dyn DataStore>,
    /// Hosted identity provider
    pub auth: Arc<dyn AuthProvider>,
    /// Payment provider
    pub billing: Arc<dyn BillingProvider>,
    /// Plan to price id mapping used at checkout
    pub billing_config: BillingConfig,
    /// Request counters
    pub metrics: Metrics,
}

/// Error response: a status and an `{"error": message}` body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 with the given message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 500 with the given message
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: &self.message })).into_response()
    }
}

impl From<SageError> for ApiError {
    fn from(e: SageError) -> Self {
        if e.is_client_error() {
            return ApiError::bad_request(e.to_string());
        }
        error!("Request failed: {}", e);
        ApiError::internal("Internal server error")
    }
}

impl From<ReplyError> for ApiError {
    fn from(e: ReplyError) -> Self {
        match e {
            ReplyError::Validation(message) => ApiError::bad_request(message),
            ReplyError::GenerationFailed => ApiError::internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// POST /api/generate-reply body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReplyBody {
    #[serde(default)]
    pub email_content: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub tone: Option<Tone>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReplyResponse {
    pub reply: String,
    pub generated_at: DateTime<Utc>,
}

/// POST /api/generate-reply - Draft a reply to an email
pub async fn generate_reply(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerateReplyBody>, JsonRejection>,
) -> Result<Json<GenerateReplyResponse>, ApiError> {
    let Json(body) = body?;

    let mut request = ReplyRequest::new(body.email_content).with_tone(body.tone.unwrap_or_default());
    if let Some(context) = body.context.filter(|c| !c.trim().is_empty()) {
        request = request.with_context(context);
    }

    match state.replies.generate(request).await {
        Ok(reply) => {
            state.metrics.inc_replies_generated();
            info!("Generated reply with {} (fallback: {})", reply.model, reply.fallback);
            Ok(Json(GenerateReplyResponse {
                reply: reply.text,
                generated_at: reply.generated_at,
            }))
        }
        Err(e) => {
            if matches!(e, ReplyError::GenerationFailed) {
                state.metrics.inc_reply_failures();
            }
            Err(e.into())
        }
    }
}

/// GET /api/generate-reply - Liveness of the reply endpoint
pub async fn generate_reply_status() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Generate reply API is working",
    }))
}

/// GET /health - Service health check
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "inboxsage",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_seconds": state.metrics.uptime_seconds(),
        "providers": {
            "llm": state.replies.model_name(),
            "store": state.store.backend_name(),
            "billing": state.billing.provider_name(),
        }
    }))
}
