//! Error types for the findoc-analyzer library.
//!
//! Two error types reflect two layers of failure:
//!
//! * [`LlmError`]: a single language-model call failed. The variants are
//!   classified at the HTTP client boundary (status code and the provider's
//!   JSON error body), so callers decide on retries by matching a variant
//!   instead of grepping the message text.
//!
//! * [`AnalyzerError`]: a whole analysis job cannot proceed. This is what
//!   the orchestration boundary records on a failed job and what the HTTP
//!   layer converts into a status code.

use crate::store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// All job-level errors returned by the findoc-analyzer library.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The request was rejected before any work started (e.g. not a PDF).
    #[error("{0}")]
    Validation(String),

    /// No job with this identifier exists.
    #[error("Job not found: {job_id}")]
    JobNotFound { job_id: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// The document does not exist at the given path.
    #[error("File not found at {path}")]
    FileNotFound { path: PathBuf },

    /// The file exists but does not start with the `%PDF` magic bytes.
    #[error("File is not a valid PDF: '{path}' (first bytes: {magic:?})")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// lopdf could not parse the document.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// A language-model call failed with a non-retryable error.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Every attempt of the agent pipeline hit a rate limit.
    #[error("Rate limit exceeded after {attempts} attempts: {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },

    // ── Persistence / IO errors ───────────────────────────────────────────
    /// The job store rejected a read or write.
    #[error(transparent)]
    Persistence(#[from] StoreError),

    /// Could not write the uploaded document to local storage.
    #[error("Failed to store upload at '{path}': {source}")]
    UploadWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a worker task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failed call to the language-model endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    /// HTTP 429 or a provider error body tagged as a rate limit.
    #[error("Rate limit reached for {provider}: {message}")]
    RateLimited {
        provider: String,
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// 401/403: the API key is missing, wrong, or lacks access.
    #[error("Authentication error from {provider}: {message}")]
    Auth { provider: String, message: String },

    /// Any other non-success response.
    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request did not complete within the client timeout.
    #[error("LLM request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Connection refused, DNS failure, TLS error, ...
    #[error("LLM transport error: {0}")]
    Transport(String),

    /// The provider answered 200 but produced no text.
    #[error("Language model returned an empty result")]
    EmptyResponse,

    /// The 200 response body did not have the chat-completions shape.
    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),
}

impl LlmError {
    /// True for the transient rate-limit class, the only class the
    /// orchestrator retries.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }
}
