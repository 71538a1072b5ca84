//! Server binary for findoc-analyzer.
//!
//! A thin shim over the library crate: maps CLI flags and environment
//! variables to the store, the LLM client, and `AnalyzerConfig`, then
//! serves the HTTP API.

use anyhow::{bail, Context, Result};
use clap::Parser;
use findoc_analyzer::{
    api, Analyzer, AnalyzerConfig, LlmEndpoint, OpenAiCompatibleClient, SqliteStore,
};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Local SQLite file, Groq endpoint
  DATABASE_URL=sqlite://data/findoc.sqlite LLM_API_KEY=gsk_... findoc-server

  # Any OpenAI-compatible endpoint
  findoc-server --database-url sqlite://jobs.db \
    --llm-base-url http://localhost:11434/v1 --model llama3.1 --llm-api-key unused

  # Submit a document
  curl -F user_id=<id> -F file=@10-K.pdf -F query="Is the dividend safe?" \
    http://localhost:8000/analyze

ENVIRONMENT VARIABLES:
  DATABASE_URL     Job store (sqlite://<path>, <path>, or :memory:), required
  LLM_API_KEY      Bearer token for the chat-completions endpoint, required
  LLM_BASE_URL     Endpoint base URL (default: https://api.groq.com/openai/v1)
  LLM_MODEL        Model ID
  RUST_LOG         Log filter, overrides --verbose
"#;

/// Financial document analysis API.
#[derive(Parser, Debug)]
#[command(
    name = "findoc-server",
    version,
    about = "Serve the financial document analysis API",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Job store connection string.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// API key for the language-model endpoint.
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    llm_api_key: String,

    /// Base URL of the OpenAI-compatible endpoint.
    #[arg(long, env = "LLM_BASE_URL", default_value = findoc_analyzer::config::DEFAULT_BASE_URL)]
    llm_base_url: String,

    /// Model ID.
    #[arg(long, env = "LLM_MODEL", default_value = findoc_analyzer::config::DEFAULT_MODEL)]
    model: String,

    /// Per-request LLM timeout in seconds.
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = 120)]
    llm_timeout_secs: u64,

    /// Address to bind.
    #[arg(long, env = "FINDOC_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to bind.
    #[arg(short, long, env = "FINDOC_PORT", default_value_t = 8000)]
    port: u16,

    /// Directory for uploads while a job runs.
    #[arg(long, env = "FINDOC_UPLOAD_DIR", default_value = "data")]
    upload_dir: PathBuf,

    /// Fixed delay between rate-limited pipeline attempts, in milliseconds.
    #[arg(long, env = "FINDOC_RETRY_DELAY_MS", default_value_t = 2000)]
    retry_delay_ms: u64,

    /// Sampling temperature.
    #[arg(long, env = "FINDOC_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Maximum upload size in MiB.
    #[arg(long, env = "FINDOC_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Wiring ───────────────────────────────────────────────────────────
    if cli.database_url.trim().is_empty() {
        bail!("DATABASE_URL is empty; a job store connection string is required");
    }
    let store = SqliteStore::connect(&cli.database_url)
        .with_context(|| "Failed to open job store")?;

    let endpoint = LlmEndpoint::new(cli.llm_api_key.clone())
        .base_url(cli.llm_base_url.clone())
        .model(cli.model.clone())
        .timeout_secs(cli.llm_timeout_secs);
    tracing::info!(?endpoint, "Using language model");
    let model = OpenAiCompatibleClient::new(endpoint).context("Failed to build LLM client")?;

    let config = AnalyzerConfig::builder()
        .upload_dir(cli.upload_dir.clone())
        .retry_delay_ms(cli.retry_delay_ms)
        .temperature(cli.temperature)
        .max_upload_bytes(cli.max_upload_mb.saturating_mul(1024 * 1024))
        .build()
        .context("Invalid analyzer configuration")?;

    let analyzer = Analyzer::new(Arc::new(store), Arc::new(model), config);

    let addr = SocketAddr::new(cli.host, cli.port);
    api::server::serve(addr, analyzer)
        .await
        .with_context(|| format!("Server on {addr} failed"))?;
    Ok(())
}
