//! PostgREST-backed store
//!
//! Every collection is fetched with `select=*` and the same ordering the
//! dashboard expects; the service key is sent both as `apikey` and as a
//! bearer token.

use super::DataStore;
use crate::error::{Result, SageError};
use crate::models::{AccountRecord, ReplyRecord, Subscription, TemplateRecord};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub struct RestStore {
    base_url: String,
    service_key: String,
    client: reqwest::Client,
}

impl RestStore {
    /// `project_url` is the project root, e.g. `https://abc.supabase.co`
    pub fn new(project_url: &str, service_key: String) -> Self {
        Self {
            base_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            service_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, &str)]) -> Result<Vec<T>> {
        debug!("RestStore: GET {} {:?}", table, query);

        let response = self
            .client
            .get(self.table_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("RestStore: {} query failed with status {}: {}", table, status, body);
            return Err(SageError::Provider(format!(
                "{} query failed: {} - {}",
                table, status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl DataStore for RestStore {
    async fn accounts(&self) -> Result<Vec<AccountRecord>> {
        self.select("users", &[("select", "*"), ("order", "created_at.desc")])
            .await
    }

    async fn replies(&self) -> Result<Vec<ReplyRecord>> {
        self.select("replies", &[("select", "*"), ("order", "created_at.desc")])
            .await
    }

    async fn templates(&self) -> Result<Vec<TemplateRecord>> {
        self.select("templates", &[("select", "*"), ("order", "usage_count.desc")])
            .await
    }

    async fn subscription(&self, user_id: &str) -> Result<Option<Subscription>> {
        let filter = format!("eq.{}", user_id);
        let rows: Vec<Subscription> = self
            .select(
                "user_subscriptions",
                &[("select", "*"), ("user_id", filter.as_str()), ("limit", "1")],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    fn backend_name(&self) -> &str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url() {
        let store = RestStore::new("https://abc.supabase.co/", "key".to_string());
        assert_eq!(store.table_url("users"), "https://abc.supabase.co/rest/v1/users");
    }

    #[test]
    fn test_postgrest_rows_deserialize() {
        let raw = r#"[
            {"id": "7b1c", "email": "a@example.com", "created_at": "2025-05-01T10:00:00.123456+00:00",
             "last_sign_in_at": null, "subscription_status": "trial", "full_name": "Ada"},
            {"id": "8c2d", "created_at": "2025-05-02T10:00:00"}
        ]"#;

        let rows: Vec<AccountRecord> = serde_json::from_str(raw).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].subscription_status.as_deref(), Some("trial"));
        assert!(rows[0].created_at.is_some());
        assert!(rows[0].last_sign_in_at.is_none());
        assert!(rows[1].email.is_none());
        assert!(rows[1].created_at.is_some());
    }

    #[test]
    fn test_bigint_ids_deserialize() {
        let replies: Vec<ReplyRecord> = serde_json::from_str(
            r#"[{"id": 42, "user_id": "7b1c", "created_at": "2025-05-01T10:00:00+00:00"}, {"id": 43}]"#,
        )
        .unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].id, "42");
        assert_eq!(replies[1].id, "43");

        let templates: Vec<TemplateRecord> =
            serde_json::from_str(r#"[{"id": 1, "name": "Welcome", "usage_count": 3}]"#).unwrap();
        assert_eq!(templates[0].id, "1");
        assert_eq!(templates[0].name.as_deref(), Some("Welcome"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let store = RestStore::new("http://127.0.0.1:9", "key".to_string());
        assert!(store.accounts().await.is_err());
    }
}
