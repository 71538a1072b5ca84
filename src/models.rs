//! Records persisted by the job store and values produced by the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered caller. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of an analysis job.
///
/// `Processing` moves exactly once to `Completed` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One document-analysis request's lifecycle record.
///
/// Serialises to the shape returned by `GET /result/{job_id}`; the
/// optional fields are omitted until the job reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub user_id: String,
    pub file_name: String,
    pub query: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for a freshly accepted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub job_id: String,
    pub user_id: String,
    pub file_name: String,
    pub query: String,
}

/// The four stages of the agent pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Verifier,
    FinancialAnalyst,
    InvestmentAdvisor,
    RiskAssessor,
}

impl AgentRole {
    /// Execution order.
    pub const ALL: [AgentRole; 4] = [
        AgentRole::Verifier,
        AgentRole::FinancialAnalyst,
        AgentRole::InvestmentAdvisor,
        AgentRole::RiskAssessor,
    ];

    /// Section heading used in the rendered report.
    pub fn heading(self) -> &'static str {
        match self {
            AgentRole::Verifier => "Verification",
            AgentRole::FinancialAnalyst => "Financial Analysis",
            AgentRole::InvestmentAdvisor => "Investment Analysis",
            AgentRole::RiskAssessor => "Risk Assessment",
        }
    }
}

/// Text produced by one agent stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutput {
    pub role: AgentRole,
    pub text: String,
}

/// Result of a full agent-pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub stages: Vec<StageOutput>,
}

impl AnalysisReport {
    /// Output of the last stage that ran (the risk assessment on a full run).
    pub fn final_output(&self) -> Option<&str> {
        self.stages.last().map(|s| s.text.as_str())
    }

    /// Render every stage under its heading, in execution order.
    pub fn render(&self) -> String {
        self.stages
            .iter()
            .map(|s| format!("## {}\n\n{}", s.role.heading(), s.text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
