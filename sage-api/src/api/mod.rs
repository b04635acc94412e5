//! HTTP API for InboxSage
//!
//! Handlers parse the request, call a service and map the outcome to a
//! status code and JSON body.

pub mod auth;
pub mod billing;
pub mod handlers;
pub mod metrics;
pub mod server;
pub mod stats;

pub use handlers::{ApiError, AppState};
pub use metrics::Metrics;
pub use server::ApiServer;
