//! Read access to the hosted relational data service
//!
//! Backends:
//! - [`rest`]: PostgREST endpoint of the hosted project
//! - [`sqlite`]: local SQLite database for development
//! - [`memory`]: in-process collections for tests

pub mod memory;
pub mod rest;
pub mod sqlite;

pub use memory::MemoryStore;
pub use rest::RestStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{AccountRecord, ReplyRecord, Subscription, TemplateRecord};

/// Read-only view over the collections the service depends on
#[async_trait::async_trait]
pub trait DataStore: Send + Sync {
    /// All accounts, most recently created first
    async fn accounts(&self) -> Result<Vec<AccountRecord>>;

    /// All generated reply records, most recently created first
    async fn replies(&self) -> Result<Vec<ReplyRecord>>;

    /// All templates, most used first
    async fn templates(&self) -> Result<Vec<TemplateRecord>>;

    /// Subscription row for a user, if any
    async fn subscription(&self, user_id: &str) -> Result<Option<Subscription>>;

    /// Short backend name for logs
    fn backend_name(&self) -> &str;
}
