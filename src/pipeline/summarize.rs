//! Summarizer: compress raw document text into a structured financial brief.
//!
//! Exactly one LLM call, no retry at this layer. Whatever the client
//! returns, success or error, goes back to the caller unchanged.

use crate::config::AnalyzerConfig;
use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionOptions, LanguageModel};
use crate::prompts::summary_prompt;
use std::time::Instant;
use tracing::debug;

/// Summarize `document` into a brief of at most ~700 words.
pub async fn summarize(
    model: &dyn LanguageModel,
    document: &str,
    config: &AnalyzerConfig,
) -> Result<String, LlmError> {
    let start = Instant::now();
    let messages = [ChatMessage::user(summary_prompt(document))];
    let summary = model.complete(&messages, &build_options(config)).await?;
    debug!(
        "Summarized {} chars into {} chars in {:?}",
        document.len(),
        summary.len(),
        start.elapsed()
    );
    Ok(summary)
}

/// Build `CompletionOptions` from the analyzer config.
pub(crate) fn build_options(config: &AnalyzerConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    #[test]
    fn build_options_defaults() {
        let opts = build_options(&AnalyzerConfig::default());
        assert_eq!(opts.temperature, Some(0.3));
        assert_eq!(opts.max_tokens, Some(1000));
    }

    #[tokio::test]
    async fn returns_response_verbatim() {
        let model = ScriptedModel::new(vec![Ok("  Revenue: $4.2B\n".into())]);
        let brief = summarize(&model, "raw text", &AnalyzerConfig::default())
            .await
            .unwrap();
        assert_eq!(brief, "  Revenue: $4.2B\n");

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("Document:\nraw text"));
    }

    #[tokio::test]
    async fn rate_limit_propagates_without_retry() {
        let model = ScriptedModel::new(vec![
            Err(ScriptedModel::rate_limited()),
            Ok("never reached".into()),
        ]);
        let err = summarize(&model, "raw", &AnalyzerConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_rate_limit());
        assert_eq!(model.calls().len(), 1);
    }
}
