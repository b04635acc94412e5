//! Configuration for sage-api
//!
//! Sources are layered, later ones winning:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. a TOML file (`config.toml` in the working directory, or `--config`)
//! 3. `INBOXSAGE_<SECTION>__<KEY>` environment variables
//! 4. the provider variables `OPENAI_API_KEY`, `STRIPE_SECRET_KEY`,
//!    `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY` and `SUPABASE_ANON_KEY`

use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub billing: BillingConfig,
    pub dashboard: DashboardConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address the HTTP API binds to
    pub listen_addr: String,
}

/// Which text-generation provider to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    Ollama,
    Mock,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Unset means OpenAI when an API key is present, otherwise the mock
    pub provider: Option<LlmProvider>,
    /// OpenAI secret (`OPENAI_API_KEY`)
    pub api_key: Option<String>,
    /// Model name passed to the provider
    pub model: String,
    /// Override the provider endpoint (proxies, local gateways)
    pub base_url: Option<String>,
    /// Sampling temperature for reply drafts
    pub temperature: f32,
    /// Upper bound on generated tokens per reply
    pub max_tokens: u32,
}

/// Where dashboard records are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Hosted PostgREST endpoint
    Rest,
    /// Local SQLite database
    Sqlite,
    /// Empty in-memory store
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Base URL of the hosted project (`https://<ref>.supabase.co`)
    pub url: Option<String>,
    /// Service-role key sent to the REST endpoint
    pub service_key: Option<String>,
    /// SQLite URL for the sqlite backend
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Project URL; the auth API lives under `/auth/v1`
    pub url: Option<String>,
    /// Public anon key sent with every auth request
    pub anon_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BillingConfig {
    /// Stripe secret key (`STRIPE_SECRET_KEY`)
    pub api_key: Option<String>,
    pub base_url: String,
    /// Plan id -> provider price id; plans without an entry use their own id
    #[serde(default)]
    pub price_ids: HashMap<String, String>,
}

impl LlmConfig {
    /// The provider in effect once the API key has been taken into account
    pub fn provider(&self) -> LlmProvider {
        match (self.provider, &self.api_key) {
            (Some(provider), _) => provider,
            (None, Some(_)) => LlmProvider::OpenAi,
            (None, None) => LlmProvider::Mock,
        }
    }
}

impl BillingConfig {
    pub fn price_id_for<'a>(&'a self, plan_id: &'a str) -> &'a str {
        self.price_ids.get(plan_id).map(String::as_str).unwrap_or(plan_id)
    }
}

/// How the dashboard's daily series is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesMode {
    /// Per-day counts from record creation timestamps
    Historical,
    /// Per-day mean with random jitter
    Synthetic,
    /// Per-day mean
    Flat,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Placeholder monthly price used for revenue figures
    pub price_per_account: f64,
    /// Fixed figure, not computed
    pub conversion_rate: f64,
    /// Fixed figure, not computed
    pub churn_rate: f64,
    pub active_window_days: i64,
    pub series_days: u32,
    pub series_mode: SeriesMode,
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            price_per_account: 29.0,
            conversion_rate: 25.5,
            churn_rate: 5.2,
            active_window_days: 30,
            series_days: 30,
            series_mode: SeriesMode::Historical,
            top_n: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Timeout applied to every outbound provider request
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Config {
    /// Load from the default sources and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, std::env::vars().collect())
    }

    /// Load with an explicit environment map
    pub fn load_with_env(path: Option<&Path>, env: HashMap<String, String>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Config::default())?);

        match path {
            Some(path) => builder = builder.add_source(File::from(path)),
            None if Path::new("config.toml").exists() => {
                builder = builder.add_source(File::with_name("config"))
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix("INBOXSAGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone().into_iter().collect())),
        );

        let well_known = [
            ("llm.api_key", "OPENAI_API_KEY"),
            ("billing.api_key", "STRIPE_SECRET_KEY"),
            ("store.url", "SUPABASE_URL"),
            ("store.service_key", "SUPABASE_SERVICE_ROLE_KEY"),
            ("auth.url", "SUPABASE_URL"),
            ("auth.anon_key", "SUPABASE_ANON_KEY"),
        ];
        for (key, var) in well_known {
            let value = env.get(var).filter(|v| !v.is_empty()).cloned();
            builder = builder.set_override_option(key, value)?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file only, without environment layering
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::SageError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        use crate::error::SageError;

        if self.dashboard.series_days == 0 {
            return Err(SageError::Config("dashboard.series_days must be positive".to_string()));
        }
        if self.dashboard.active_window_days <= 0 {
            return Err(SageError::Config(
                "dashboard.active_window_days must be positive".to_string(),
            ));
        }
        if self.store.backend == StoreBackend::Rest && self.store.url.is_none() {
            return Err(SageError::Config(
                "store.url (or SUPABASE_URL) is required for the rest backend".to_string(),
            ));
        }
        if self.llm.provider() == LlmProvider::OpenAi && self.llm.api_key.is_none() {
            return Err(SageError::Config(
                "llm.api_key (or OPENAI_API_KEY) is required for the openai provider".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: "0.0.0.0:3000".to_string(),
            },
            llm: LlmConfig {
                provider: None,
                api_key: None,
                model: sage_ai::llm::openai::DEFAULT_MODEL.to_string(),
                base_url: None,
                temperature: 0.7,
                max_tokens: 500,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                url: None,
                service_key: None,
                database_url: "sqlite://inboxsage.db".to_string(),
            },
            auth: AuthConfig {
                url: None,
                anon_key: None,
            },
            billing: BillingConfig {
                api_key: None,
                base_url: crate::billing::stripe::DEFAULT_BASE_URL.to_string(),
                price_ids: HashMap::new(),
            },
            dashboard: DashboardConfig::default(),
            http: HttpConfig { timeout_seconds: 30 },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::load_with_env(Some(Path::new("does-not-matter.toml")), HashMap::new());
        // An explicit file that does not exist is an error
        assert!(config.is_err());

        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.dashboard.series_days, 30);
        assert_eq!(config.dashboard.series_mode, SeriesMode::Historical);
    }

    #[test]
    fn test_file_then_env_layering() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[llm]
provider = "ollama"
model = "mistral:latest"
temperature = 0.3

[dashboard]
price_per_account = 19.0
series_mode = "flat"
"#
        )
        .unwrap();

        let config = Config::load_with_env(
            Some(file.path()),
            env(&[
                ("INBOXSAGE_LLM__MODEL", "llama3.1:latest"),
                ("INBOXSAGE_SERVER__LISTEN_ADDR", "127.0.0.1:9000"),
                ("STRIPE_SECRET_KEY", "sk_test_123"),
            ]),
        )
        .unwrap();

        assert_eq!(config.llm.provider(), LlmProvider::Ollama);
        assert_eq!(config.llm.model, "llama3.1:latest");
        assert!((config.llm.temperature - 0.3).abs() < 1e-6);
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.server.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.billing.api_key.as_deref(), Some("sk_test_123"));
        assert!((config.dashboard.price_per_account - 19.0).abs() < f64::EPSILON);
        assert_eq!(config.dashboard.series_mode, SeriesMode::Flat);
        assert_eq!(config.dashboard.top_n, 10);
    }

    #[test]
    fn test_supabase_variables_fill_store_and_auth() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[store]\nbackend = \"rest\"").unwrap();

        let config = Config::load_with_env(
            Some(file.path()),
            env(&[
                ("SUPABASE_URL", "https://abc.supabase.co"),
                ("SUPABASE_SERVICE_ROLE_KEY", "service"),
                ("SUPABASE_ANON_KEY", "anon"),
            ]),
        )
        .unwrap();

        assert_eq!(config.store.backend, StoreBackend::Rest);
        assert_eq!(config.store.url.as_deref(), Some("https://abc.supabase.co"));
        assert_eq!(config.store.service_key.as_deref(), Some("service"));
        assert_eq!(config.auth.url.as_deref(), Some("https://abc.supabase.co"));
        assert_eq!(config.auth.anon_key.as_deref(), Some("anon"));
    }

    #[test]
    fn test_openai_key_selects_openai() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();

        let config = Config::load_with_env(Some(file.path()), env(&[("OPENAI_API_KEY", "sk-live")])).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-live"));
        assert_eq!(config.llm.provider(), LlmProvider::OpenAi);

        let config = Config::load_with_env(Some(file.path()), HashMap::new()).unwrap();
        assert_eq!(config.llm.provider(), LlmProvider::Mock);
    }

    #[test]
    fn test_explicit_provider_wins_over_key() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[llm]\nprovider = \"mock\"").unwrap();

        let config = Config::load_with_env(Some(file.path()), env(&[("OPENAI_API_KEY", "sk-live")])).unwrap();
        assert_eq!(config.llm.provider(), LlmProvider::Mock);
    }

    #[test]
    fn test_rest_backend_requires_url() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Rest;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_openai_requires_key() {
        let mut config = Config::default();
        config.llm.provider = Some(LlmProvider::OpenAi);
        assert!(config.validate().is_err());

        config.llm.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_price_id_lookup() {
        let mut config = Config::default();
        config
            .billing
            .price_ids
            .insert("pro".to_string(), "price_123".to_string());

        assert_eq!(config.billing.price_id_for("pro"), "price_123");
        assert_eq!(config.billing.price_id_for("enterprise"), "enterprise");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let toml = toml::to_string(&Config::default()).unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:3000");
    }
}
