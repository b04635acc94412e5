//! Prometheus metrics for API monitoring

use axum::{
    extract::{Request, State},
    http::header::CONTENT_TYPE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::api::handlers::AppState;

/// Simple metrics collector
pub struct Metrics {
    /// Total HTTP requests
    pub http_requests_total: AtomicU64,
    /// Total HTTP errors (4xx, 5xx)
    pub http_errors_total: AtomicU64,
    /// Replies drafted by the LLM (fallbacks included)
    pub replies_generated_total: AtomicU64,
    /// Reply requests that failed validation or generation
    pub reply_failures_total: AtomicU64,
    /// Sign-in, sign-up and sign-out requests
    pub auth_attempts_total: AtomicU64,
    /// Auth requests that were rejected or failed
    pub auth_failures_total: AtomicU64,
    /// Checkout sessions created
    pub checkouts_total: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            http_requests_total: AtomicU64::new(0),
            http_errors_total: AtomicU64::new(0),
            replies_generated_total: AtomicU64::new(0),
            reply_failures_total: AtomicU64::new(0),
            auth_attempts_total: AtomicU64::new(0),
            auth_failures_total: AtomicU64::new(0),
            checkouts_total: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Increment HTTP requests counter
    pub fn inc_requests(&self) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment HTTP errors counter
    pub fn inc_errors(&self) {
        self.http_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment generated replies counter
    pub fn inc_replies_generated(&self) {
        self.replies_generated_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment failed replies counter
    pub fn inc_reply_failures(&self) {
        self.reply_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment auth attempts counter
    pub fn inc_auth_attempts(&self) {
        self.auth_attempts_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment auth failures counter
    pub fn inc_auth_failures(&self) {
        self.auth_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment checkouts counter
    pub fn inc_checkouts(&self) {
        self.checkouts_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Format metrics in Prometheus format
    pub fn to_prometheus(&self) -> String {
        let counters = [
            ("http_requests_total", "Total HTTP requests", &self.http_requests_total),
            ("http_errors_total", "Total HTTP errors (4xx, 5xx)", &self.http_errors_total),
            ("replies_generated_total", "Replies generated", &self.replies_generated_total),
            ("reply_failures_total", "Reply generation failures", &self.reply_failures_total),
            ("auth_attempts_total", "Total authentication attempts", &self.auth_attempts_total),
            ("auth_failures_total", "Failed authentication attempts", &self.auth_failures_total),
            ("checkouts_total", "Checkout sessions created", &self.checkouts_total),
        ];

        let mut out = String::new();
        for (name, help, value) in counters {
            out.push_str(&format!(
                "# HELP inboxsage_{name} {help}\n# TYPE inboxsage_{name} counter\ninboxsage_{name} {}\n\n",
                value.load(Ordering::Relaxed)
            ));
        }
        out.push_str(&format!(
            "# HELP inboxsage_uptime_seconds Server uptime in seconds\n# TYPE inboxsage_uptime_seconds gauge\ninboxsage_uptime_seconds {}\n",
            self.uptime_seconds()
        ));
        out
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Count every request and every error response
pub async fn track_requests(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    state.metrics.inc_requests();
    let response = next.run(req).await;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        state.metrics.inc_errors();
    }
    response
}

/// GET /metrics
pub async fn prometheus(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}
