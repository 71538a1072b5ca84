//! Language-model access: the [`LanguageModel`] seam and an
//! OpenAI-compatible chat-completions client.
//!
//! Everything above this module talks to `Arc<dyn LanguageModel>`, so tests
//! swap in scripted fakes and production uses [`OpenAiCompatibleClient`].
//! Error classification happens here, once: a 429 or a provider error body
//! tagged `rate_limit_exceeded` becomes [`LlmError::RateLimited`]; nothing
//! upstream inspects message text.

use crate::config::LlmEndpoint;
use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a chat-completions request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters sent with each request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

/// A text-generation backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short provider label used in logs and errors.
    fn name(&self) -> &str;

    /// Run one completion and return the generated text.
    ///
    /// Implementations return [`LlmError::EmptyResponse`] rather than an
    /// empty string.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmError>;
}

/// Client for any endpoint speaking the OpenAI chat-completions protocol
/// (Groq, OpenAI, vLLM, Ollama's `/v1`, ...).
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    endpoint: LlmEndpoint,
    provider: String,
}

impl OpenAiCompatibleClient {
    pub fn new(endpoint: LlmEndpoint) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        let provider = reqwest::Url::parse(&endpoint.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| endpoint.base_url.clone());
        Ok(Self {
            http,
            endpoint,
            provider,
        })
    }

    pub fn model(&self) -> &str {
        &self.endpoint.model
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Deserialize)]
struct ErrorPayload {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<serde_json::Value>,
}

const RATE_LIMIT_CODE: &str = "rate_limit_exceeded";

/// Map a non-success response to a structured [`LlmError`].
pub(crate) fn classify_failure(
    provider: &str,
    status: u16,
    retry_after_secs: Option<u64>,
    body: &str,
) -> LlmError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let tagged_rate_limit = parsed.as_ref().is_some_and(|p| {
        p.kind.as_deref() == Some(RATE_LIMIT_CODE)
            || p.code.as_ref().and_then(|c| c.as_str()) == Some(RATE_LIMIT_CODE)
    });
    let message = parsed
        .and_then(|p| p.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            let raw = body.trim();
            if raw.is_empty() {
                format!("HTTP {status}")
            } else {
                raw.to_string()
            }
        });

    if status == 429 || tagged_rate_limit {
        return LlmError::RateLimited {
            provider: provider.to_string(),
            message,
            retry_after_secs,
        };
    }
    match status {
        401 | 403 => LlmError::Auth {
            provider: provider.to_string(),
            message,
        },
        _ => LlmError::Api { status, message },
    }
}

/// Pull the generated text out of a 200 response body.
pub(crate) fn extract_content(body: &str) -> Result<String, LlmError> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)
}

#[async_trait]
impl LanguageModel for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.provider
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let start = Instant::now();
        let request = CompletionRequest {
            model: &self.endpoint.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let response = self
            .http
            .post(self.endpoint.completions_url())
            .bearer_auth(&self.endpoint.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(classify_failure(
                &self.provider,
                status.as_u16(),
                retry_after,
                &body,
            ));
        }

        let content = extract_content(&body)?;
        debug!(
            provider = %self.provider,
            model = %self.endpoint.model,
            chars = content.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "completion received"
        );
        Ok(content)
    }
}

impl OpenAiCompatibleClient {
    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout {
                secs: self.endpoint.timeout_secs,
            }
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    #[test]
    fn request_body_shape() {
        let messages = [ChatMessage::system("be terse"), ChatMessage::user("hi")];
        let body = serde_json::to_value(CompletionRequest {
            model: "m",
            messages: &messages,
            temperature: Some(0.3),
            max_tokens: None,
        })
        .unwrap();
        assert_eq!(body["model"], "m");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn status_429_is_rate_limited() {
        let e = classify_failure("api.groq.com", 429, Some(7), "");
        assert_eq!(
            e,
            LlmError::RateLimited {
                provider: "api.groq.com".into(),
                message: "HTTP 429".into(),
                retry_after_secs: Some(7),
            }
        );
    }

    #[test]
    fn tagged_body_is_rate_limited_regardless_of_status() {
        let body = r#"{"error":{"message":"Request too large for model","type":"tokens","code":"rate_limit_exceeded"}}"#;
        let e = classify_failure("groq", 413, None, body);
        assert!(e.is_rate_limit());
        assert!(e.to_string().contains("Request too large"));
    }

    #[test]
    fn rate_limit_wording_alone_is_not_a_rate_limit() {
        // Only the structured tag counts, not text that happens to mention it.
        let body = r#"{"error":{"message":"rate_limit misconfigured on proxy","type":"server_error"}}"#;
        let e = classify_failure("proxy", 500, None, body);
        assert_eq!(
            e,
            LlmError::Api {
                status: 500,
                message: "rate_limit misconfigured on proxy".into()
            }
        );
    }

    #[test]
    fn unauthorized_is_auth() {
        let e = classify_failure("groq", 401, None, "invalid api key");
        assert!(matches!(e, LlmError::Auth { ref message, .. } if message == "invalid api key"));
    }

    #[test]
    fn extract_content_rejects_blank_completion() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  "}}]}"#;
        assert_eq!(extract_content(body), Err(LlmError::EmptyResponse));
        assert_eq!(extract_content(r#"{"choices":[]}"#), Err(LlmError::EmptyResponse));
        assert!(matches!(
            extract_content("not json"),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    async fn spawn_stub(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    #[tokio::test]
    async fn client_returns_completion_text() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|Json(req): Json<serde_json::Value>| async move {
                let last = req["messages"][1]["content"].as_str().unwrap_or("").to_string();
                Json(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": format!("echo: {last}")}}]
                }))
            }),
        );
        let base = spawn_stub(app).await;
        let client = OpenAiCompatibleClient::new(LlmEndpoint::new("k").base_url(base)).unwrap();
        assert_eq!(client.name(), "127.0.0.1");

        let text = client
            .complete(
                &[ChatMessage::system("s"), ChatMessage::user("ping")],
                &CompletionOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(text, "echo: ping");
    }

    #[tokio::test]
    async fn client_surfaces_rate_limit_with_retry_after() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [("retry-after", "3")],
                    r#"{"error":{"message":"Rate limit reached","code":"rate_limit_exceeded"}}"#,
                )
            }),
        );
        let base = spawn_stub(app).await;
        let client = OpenAiCompatibleClient::new(LlmEndpoint::new("k").base_url(base)).unwrap();

        let err = client
            .complete(&[ChatMessage::user("x")], &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LlmError::RateLimited {
                retry_after_secs: Some(3),
                ..
            }
        ));
    }
}
