//! Job store: users and analysis jobs keyed by generated identifiers.
//!
//! Every operation touches exactly one record. The only cross-call rule is
//! the job lifecycle: `complete_job` / `fail_job` succeed only while the
//! job is still `processing`, so a terminal state is written at most once.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::models::{Job, NewJob, User};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from the job store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration v{version} failed: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Invalid database URL '{0}'")]
    InvalidUrl(String),

    #[error("Job {job_id} does not exist")]
    UnknownJob { job_id: String },

    /// The job already reached a terminal state.
    #[error("Job {job_id} is already {status}")]
    NotProcessing { job_id: String, status: String },

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Store task failed: {0}")]
    Task(String),
}

/// Persistence for users and jobs. Implementations must be safe to share
/// across concurrently running jobs.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new user with a generated identifier.
    async fn create_user(&self, name: &str, email: &str) -> Result<User, StoreError>;

    /// Insert a job in the `processing` state.
    async fn create_job(&self, job: NewJob) -> Result<Job, StoreError>;

    /// `processing` → `completed`, recording the report text.
    async fn complete_job(&self, job_id: &str, analysis: &str) -> Result<(), StoreError>;

    /// `processing` → `failed`, recording the error message.
    async fn fail_job(&self, job_id: &str, error: &str) -> Result<(), StoreError>;

    /// Fetch a job, `None` when the identifier is unknown.
    async fn get_job(&self, job_id: &str) -> Result<Option<Job>, StoreError>;
}
