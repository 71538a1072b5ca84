//! Agent pipeline: four persona-bound LLM calls in fixed order.
//!
//! ```text
//! summary ──▶ verifier ──▶ financial analyst ──▶ investment advisor ──▶ risk assessor
//! ```
//!
//! Each stage sees the same summary and query; stages never delegate to one
//! another. The first failing stage aborts the run and its error is
//! returned as-is so the caller's retry policy can inspect it.

use crate::config::AnalyzerConfig;
use crate::error::LlmError;
use crate::llm::{ChatMessage, LanguageModel};
use crate::models::{AgentRole, AnalysisReport, StageOutput};
use crate::pipeline::summarize::build_options;
use crate::prompts::{persona, system_prompt, task_prompt};
use std::time::Instant;
use tracing::{debug, warn};

/// Run all four stages sequentially against the shared summary.
pub async fn run_agents(
    model: &dyn LanguageModel,
    query: &str,
    summary: &str,
    config: &AnalyzerConfig,
) -> Result<AnalysisReport, LlmError> {
    let options = build_options(config);
    let mut report = AnalysisReport::default();

    for role in AgentRole::ALL {
        let start = Instant::now();
        let p = persona(role);
        let messages = [
            ChatMessage::system(system_prompt(p)),
            ChatMessage::user(task_prompt(p, query, summary)),
        ];

        let text = model.complete(&messages, &options).await.map_err(|e| {
            warn!("{} stage failed: {}", role.heading(), e);
            e
        })?;
        debug!(
            "{} stage produced {} chars in {:?}",
            role.heading(),
            text.len(),
            start.elapsed()
        );
        report.stages.push(StageOutput { role, text });
    }

    Ok(report)
}
