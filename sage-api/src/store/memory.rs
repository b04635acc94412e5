//! In-memory store
//!
//! Holds fixed collections; any collection can be switched to fail so the
//! dashboard's degrade-to-empty path can be exercised.

use super::DataStore;
use crate::error::{Result, SageError};
use crate::models::{AccountRecord, ReplyRecord, Subscription, TemplateRecord};

/// Collections a [`MemoryStore`] can be told to fail on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Accounts,
    Replies,
    Templates,
    Subscriptions,
}

#[derive(Default)]
pub struct MemoryStore {
    accounts: Vec<AccountRecord>,
    replies: Vec<ReplyRecord>,
    templates: Vec<TemplateRecord>,
    subscriptions: Vec<Subscription>,
    failing: Vec<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(mut self, accounts: Vec<AccountRecord>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn with_replies(mut self, replies: Vec<ReplyRecord>) -> Self {
        self.replies = replies;
        self
    }

    pub fn with_templates(mut self, templates: Vec<TemplateRecord>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_subscriptions(mut self, subscriptions: Vec<Subscription>) -> Self {
        self.subscriptions = subscriptions;
        self
    }

    /// Make reads of `collection` fail
    pub fn failing(mut self, collection: Collection) -> Self {
        self.failing.push(collection);
        self
    }

    fn check(&self, collection: Collection) -> Result<()> {
        if self.failing.contains(&collection) {
            return Err(SageError::Provider(format!("{:?} unavailable", collection)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DataStore for MemoryStore {
    async fn accounts(&self) -> Result<Vec<AccountRecord>> {
        self.check(Collection::Accounts)?;
        Ok(self.accounts.clone())
    }

    async fn replies(&self) -> Result<Vec<ReplyRecord>> {
        self.check(Collection::Replies)?;
        Ok(self.replies.clone())
    }

    async fn templates(&self) -> Result<Vec<TemplateRecord>> {
        self.check(Collection::Templates)?;
        Ok(self.templates.clone())
    }

    async fn subscription(&self, user_id: &str) -> Result<Option<Subscription>> {
        self.check(Collection::Subscriptions)?;
        Ok(self
            .subscriptions
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
