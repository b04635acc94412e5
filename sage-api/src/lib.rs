//! sage-api: HTTP service behind InboxSage
//!
//! Serves AI reply drafting, the sales/usage dashboard, authentication and
//! subscription billing. Every hosted dependency sits behind a trait so the
//! router can be driven against in-process fakes.
//!
//! # Example
//!
//! ```no_run
//! use sage_ai::llm::MockLlm;
//! use sage_ai::ReplyGenerator;
//! use sage_api::api::{ApiServer, AppState, Metrics};
//! use sage_api::auth::MockAuth;
//! use sage_api::billing::MockBilling;
//! use sage_api::config::Config;
//! use sage_api::dashboard::DashboardService;
//! use sage_api::store::{DataStore, MemoryStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = Config::default();
//!     let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
//!
//!     let state = AppState {
//!         replies: ReplyGenerator::new(Arc::new(MockLlm::new())),
//!         dashboard: DashboardService::new(store.clone(), config.dashboard.clone()),
//!         store,
//!         auth: Arc::new(MockAuth::new()),
//!         billing: Arc::new(MockBilling::new()),
//!         billing_config: config.billing.clone(),
//!         metrics: Metrics::new(),
//!     };
//!
//!     ApiServer::new(state, config.server.listen_addr.clone()).run().await
//! }
//! ```
//!
//! # Modules
//!
//! - [`api`]: axum router and handlers
//! - [`auth`]: hosted authentication provider
//! - [`billing`]: plan catalog and payment provider
//! - [`config`]: layered configuration
//! - [`dashboard`]: snapshot aggregation and CSV export
//! - [`store`]: data store backends

pub mod api;
pub mod auth;
pub mod billing;
pub mod config;
pub mod dashboard;
pub mod demo;
pub mod error;
pub mod models;
pub mod store;

pub use config::Config;
pub use error::{Result, SageError};
