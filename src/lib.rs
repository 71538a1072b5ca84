//! # findoc-analyzer
//!
//! Upload a financial PDF, get back an analyst-style report.
//!
//! The service extracts the document's text, compresses it into a
//! structured financial brief with one language-model call, then runs four
//! persona-bound calls over that brief (verifier, financial analyst,
//! investment advisor, risk assessor). Job status and the final report are
//! persisted so clients can poll for them.
//!
//! ## Pipeline Overview
//!
//! ```text
//! POST /analyze
//!  │
//!  ├─ 1. Upload     validate `.pdf`, write to the upload dir
//!  ├─ 2. Job        insert `processing` record
//!  ├─ 3. Read       lopdf text extraction (spawn_blocking)
//!  ├─ 4. Summarize  one LLM call → ≤700-word brief
//!  ├─ 5. Agents     4 sequential LLM calls, retried on rate limits
//!  ├─ 6. Record     `completed` + report, or `failed` + message
//!  └─ 7. Cleanup    delete the upload (best effort)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use findoc_analyzer::{api, Analyzer, AnalyzerConfig, LlmEndpoint, OpenAiCompatibleClient, SqliteStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::connect("sqlite://data/findoc.sqlite")?);
//!     let model = Arc::new(OpenAiCompatibleClient::new(LlmEndpoint::new("gsk_..."))?);
//!     let analyzer = Analyzer::new(store, model, AnalyzerConfig::default());
//!     api::server::serve("0.0.0.0:8000".parse()?, analyzer).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `findoc-server` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod store;

#[cfg(test)]
mod testing;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{Analyzer, Submission};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, LlmEndpoint};
pub use error::{AnalyzerError, LlmError};
pub use llm::{ChatMessage, CompletionOptions, LanguageModel, OpenAiCompatibleClient};
pub use models::{AgentRole, AnalysisReport, Job, JobStatus, NewJob, StageOutput, User};
pub use store::{JobStore, SqliteStore, StoreError};
