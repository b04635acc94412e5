//! InboxSage API server
//!
//! # Usage
//!
//! ```bash
//! # Serve with config.toml (if present) and environment overrides
//! sage-api
//!
//! # Explicit config file and listen address
//! sage-api --config /etc/inboxsage.toml --listen 127.0.0.1:8080
//!
//! # Fill a local SQLite database with demo records
//! sage-api seed-demo --accounts 200 --database-url sqlite://inboxsage.db
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use sage_ai::llm::{LlmEngine, MockLlm, OllamaLlm, OpenAiLlm};
use sage_ai::{GenerationSettings, ReplyGenerator};
use sage_api::api::{ApiServer, AppState, Metrics};
use sage_api::auth::{AuthProvider, GoTrueAuth, MockAuth};
use sage_api::billing::{BillingProvider, MockBilling, StripeBilling};
use sage_api::config::{Config, LlmProvider, LoggingConfig, StoreBackend};
use sage_api::dashboard::DashboardService;
use sage_api::store::{DataStore, MemoryStore, RestStore, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sage-api")]
#[command(about = "InboxSage API: reply drafting, dashboard, auth and billing", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address
    #[arg(short, long)]
    listen: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Insert demo records into a SQLite database
    SeedDemo {
        /// Number of accounts to generate
        #[arg(long, default_value_t = 50)]
        accounts: usize,
        /// Database URL (defaults to store.database_url)
        #[arg(long)]
        database_url: Option<String>,
    },
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sage_api={level},sage_ai={level},tower_http={level}",
            level = logging.level
        ))
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if logging.format == "json" {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

fn build_llm(config: &Config, client: reqwest::Client) -> anyhow::Result<Arc<dyn LlmEngine>> {
    let llm = &config.llm;
    let engine: Arc<dyn LlmEngine> = match llm.provider() {
        LlmProvider::OpenAi => {
            let api_key = llm.api_key.clone().context("OPENAI_API_KEY is not set")?;
            let mut engine = OpenAiLlm::new(api_key, llm.model.clone()).with_client(client);
            if let Some(base_url) = &llm.base_url {
                engine = engine.with_base_url(base_url.clone());
            }
            Arc::new(engine)
        }
        LlmProvider::Ollama => {
            let mut engine = OllamaLlm::new(llm.model.clone()).with_client(client);
            if let Some(base_url) = &llm.base_url {
                engine = engine.with_base_url(base_url.clone());
            }
            Arc::new(engine)
        }
        LlmProvider::Mock => {
            warn!("Using the mock LLM; replies are canned drafts");
            Arc::new(MockLlm::new())
        }
    };
    Ok(engine)
}

async fn build_store(config: &Config, client: reqwest::Client) -> anyhow::Result<Arc<dyn DataStore>> {
    let store = &config.store;
    let data_store: Arc<dyn DataStore> = match store.backend {
        StoreBackend::Rest => {
            let url = store.url.as_deref().context("SUPABASE_URL is not set")?;
            let service_key = store.service_key.clone().unwrap_or_else(|| {
                warn!("SUPABASE_SERVICE_ROLE_KEY is not set; store queries will likely be refused");
                String::new()
            });
            Arc::new(RestStore::new(url, service_key).with_client(client))
        }
        StoreBackend::Sqlite => Arc::new(SqliteStore::connect(&store.database_url).await?),
        StoreBackend::Memory => {
            warn!("Using the empty in-memory store; the dashboard will show zeroes");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(data_store)
}

fn build_auth(config: &Config, client: reqwest::Client) -> Arc<dyn AuthProvider> {
    match (&config.auth.url, &config.auth.anon_key) {
        (Some(url), Some(anon_key)) => Arc::new(GoTrueAuth::new(url, anon_key.clone()).with_client(client)),
        _ => {
            warn!("SUPABASE_URL or SUPABASE_ANON_KEY not set; using in-memory auth");
            Arc::new(MockAuth::new())
        }
    }
}

fn build_billing(config: &Config, client: reqwest::Client) -> Arc<dyn BillingProvider> {
    match &config.billing.api_key {
        Some(api_key) => Arc::new(
            StripeBilling::new(api_key.clone())
                .with_base_url(&config.billing.base_url)
                .with_client(client),
        ),
        None => {
            warn!("STRIPE_SECRET_KEY not set; using mock billing");
            Arc::new(MockBilling::new())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_seconds))
        .build()?;

    let llm = build_llm(&config, client.clone())?;
    let store = build_store(&config, client.clone()).await?;

    info!("Configuration loaded");
    info!("  Listening on: {}", config.server.listen_addr);
    info!("  LLM: {:?} ({})", config.llm.provider(), llm.model_name());
    info!("  Store: {}", store.backend_name());
    info!("  Series mode: {:?}", config.dashboard.series_mode);

    let settings = GenerationSettings {
        temperature: config.llm.temperature,
        max_tokens: config.llm.max_tokens,
    };

    let state = AppState {
        replies: ReplyGenerator::with_settings(llm, settings),
        dashboard: DashboardService::new(store.clone(), config.dashboard.clone()),
        store,
        auth: build_auth(&config, client.clone()),
        billing: build_billing(&config, client),
        billing_config: config.billing.clone(),
        metrics: Metrics::new(),
    };

    ApiServer::new(state, config.server.listen_addr.clone())
        .run()
        .await
        .context("API server failed")
}

async fn seed_demo(config: &Config, accounts: usize, database_url: Option<String>) -> anyhow::Result<()> {
    let url = database_url.unwrap_or_else(|| config.store.database_url.clone());
    let store = SqliteStore::connect(&url).await?;

    let data = {
        let mut rng = rand::thread_rng();
        sage_api::demo::generate(accounts, chrono::Utc::now(), &mut rng)
    };
    sage_api::demo::seed(&store, &data).await?;

    info!("Demo data written to {}", url);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen;
    }

    init_tracing(&config.logging)?;
    info!("Starting InboxSage API v{}", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::SeedDemo {
            accounts,
            database_url,
        } => seed_demo(&config, accounts, database_url).await,
    }
}
