//! API Server - HTTP server for the InboxSage API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::{self, AppState};
use crate::api::{auth, billing, metrics, stats};

/// API Server configuration
pub struct ApiServer {
    state: Arc<AppState>,
    addr: String,
}

impl ApiServer {
    pub fn new(state: AppState, addr: String) -> Self {
        Self {
            state: Arc::new(state),
            addr,
        }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let api_routes = Router::new()
            .route(
                "/generate-reply",
                post(handlers::generate_reply).get(handlers::generate_reply_status),
            )
            .route("/stats", get(stats::get_stats))
            .route("/stats/export.csv", get(stats::export_csv))
            .route("/auth", post(auth::auth))
            .route("/billing/plans", get(billing::list_plans))
            .route("/billing/checkout", post(billing::create_checkout))
            .route("/billing/portal", post(billing::create_portal))
            .route("/billing/subscription/:user_id", get(billing::get_subscription));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/metrics", get(metrics::prometheus))
            .nest("/api", api_routes)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                metrics::track_requests,
            ))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Start the API server
    pub async fn run(&self) -> std::io::Result<()> {
        let router = self.router();

        info!("Starting API server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
