//! Job orchestration: the single boundary that turns pipeline errors into
//! recorded job failures.
//!
//! A submission flows through:
//!
//! ```text
//! validate name ──▶ write upload ──▶ create job (processing)
//!      │                                   │
//!   400, no job          read ──▶ summarize ──▶ retry(agents ×4)
//!                                          │
//!                        completed(report) │ failed(message)
//!                                          ▼
//!                                   delete upload (always)
//! ```
//!
//! Everything after validation runs on its own Tokio task. The HTTP
//! handler awaits it, but a dropped connection cannot strand a job in
//! `processing` or leave the upload on disk.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::llm::LanguageModel;
use crate::models::{AnalysisReport, NewJob};
use crate::pipeline::retry::{retry_on_rate_limit, RetryPolicy};
use crate::pipeline::{agents, input, summarize};
use crate::store::JobStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// An uploaded document awaiting analysis.
#[derive(Debug, Clone)]
pub struct Submission {
    pub user_id: String,
    /// Client-supplied file name; must end in `.pdf`.
    pub file_name: String,
    /// Caller's question; blank falls back to the configured default.
    pub query: Option<String>,
    pub content: Vec<u8>,
}

/// Runs analysis jobs against an injected store and language model.
#[derive(Clone)]
pub struct Analyzer {
    store: Arc<dyn JobStore>,
    model: Arc<dyn LanguageModel>,
    config: Arc<AnalyzerConfig>,
}

impl Analyzer {
    pub fn new(
        store: Arc<dyn JobStore>,
        model: Arc<dyn LanguageModel>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            store,
            model,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Accept a document, run the full pipeline, and record the outcome.
    ///
    /// Returns the job id on success. On failure the job (if it was
    /// created) is already marked `failed` with the returned error's
    /// message. The upload is deleted before this returns either way.
    pub async fn submit(&self, submission: Submission) -> Result<String, AnalyzerError> {
        validate_file_name(&submission.file_name)?;

        let job = NewJob {
            job_id: uuid::Uuid::new_v4().to_string(),
            user_id: submission.user_id,
            file_name: submission.file_name,
            query: self.config.effective_query(submission.query.as_deref()),
        };
        let upload_path = self
            .config
            .upload_dir
            .join(format!("financial_document_{}.pdf", uuid::Uuid::new_v4()));
        let job_id = job.job_id.clone();

        let this = self.clone();
        let path = upload_path.clone();
        let content = submission.content;
        let outcome = tokio::spawn(async move {
            let result = this.process(job, &path, content).await;
            discard_upload(&path).await;
            result
        })
        .await;

        match outcome {
            Ok(result) => result.map(|()| job_id),
            Err(join_err) => {
                let e = AnalyzerError::Internal(format!("Analysis task failed: {}", join_err));
                discard_upload(&upload_path).await;
                self.record_failure(&job_id, &e).await;
                Err(e)
            }
        }
    }

    /// Read, summarize, and run the agent pipeline over a PDF on disk.
    ///
    /// The summary is computed once; only the agent pipeline is retried,
    /// and only on rate limits.
    pub async fn analyze_file(
        &self,
        query: &str,
        path: &Path,
    ) -> Result<AnalysisReport, AnalyzerError> {
        let start = Instant::now();
        let text = input::read_document(path).await?;
        info!("Read {} chars from {}", text.len(), path.display());

        let summary = summarize::summarize(self.model.as_ref(), &text, &self.config).await?;
        let summary = summary.as_str();

        let model = self.model.as_ref();
        let config = self.config.as_ref();
        let report = retry_on_rate_limit(RetryPolicy::from_config(config), |attempt| {
            debug!("Agent pipeline attempt {}", attempt);
            agents::run_agents(model, query, summary, config)
        })
        .await?;

        info!(
            "Agent pipeline finished: {} stages in {:?}",
            report.stages.len(),
            start.elapsed()
        );
        Ok(report)
    }

    async fn process(
        &self,
        job: NewJob,
        path: &Path,
        content: Vec<u8>,
    ) -> Result<(), AnalyzerError> {
        store_upload(path, &content).await?;
        drop(content);

        self.store.create_job(job.clone()).await?;
        info!(
            job_id = %job.job_id,
            user_id = %job.user_id,
            file_name = %job.file_name,
            "Job accepted"
        );

        let result = async {
            let report = self.analyze_file(&job.query, path).await?;
            self.store.complete_job(&job.job_id, &report.render()).await?;
            Ok::<(), AnalyzerError>(())
        }
        .await;

        match &result {
            Ok(()) => info!(job_id = %job.job_id, "Job completed"),
            Err(e) => self.record_failure(&job.job_id, e).await,
        }
        result
    }

    async fn record_failure(&self, job_id: &str, e: &AnalyzerError) {
        error!(job_id, error = %e, "Job failed");
        if let Err(store_err) = self.store.fail_job(job_id, &e.to_string()).await {
            warn!(job_id, error = %store_err, "Could not record job failure");
        }
    }
}

/// Reject anything not named `*.pdf` (case-insensitive).
pub fn validate_file_name(file_name: &str) -> Result<(), AnalyzerError> {
    if file_name.to_ascii_lowercase().ends_with(".pdf") {
        Ok(())
    } else {
        Err(AnalyzerError::Validation(
            "Only PDF files are supported.".to_string(),
        ))
    }
}

async fn store_upload(path: &Path, content: &[u8]) -> Result<(), AnalyzerError> {
    let write_failed = |source| AnalyzerError::UploadWriteFailed {
        path: PathBuf::from(path),
        source,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }
    tokio::fs::write(path, content).await.map_err(write_failed)?;
    debug!("Stored {} byte upload at {}", content.len(), path.display());
    Ok(())
}

/// Best-effort removal; failures are logged and swallowed.
async fn discard_upload(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed upload {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove upload {}: {}", path.display(), e),
    }
}
