//! Structured LLM caller
//!
//! Wraps an OpenAI-style JSON-mode chat completion behind a backend trait,
//! with a per-call timeout and exponential-backoff retry. The caller
//! guarantees "valid JSON or a typed error"; validating the shape of that
//! JSON belongs to the call sites.

mod error;
mod extract;

pub use error::LlmError;
pub use extract::extract_json_block;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default per-call deadline
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(45);

/// Options for a single structured call
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub temperature: f32,
    pub timeout: Duration,
    pub max_tokens: Option<u32>,
}

impl Default for CallOptions {
    fn default() -> Self {
        CallOptions {
            temperature: 0.7,
            timeout: DEFAULT_CALL_TIMEOUT,
            max_tokens: None,
        }
    }
}

/// Retry schedule: delay = base × 2^retry + jitter, capped at max_delay
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Delay before the (retry+1)-th re-attempt, zero-based
    fn delay_for(&self, retry: u32) -> Duration {
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.max_delay);
        let jitter_ceiling = self.base_delay.as_millis() as u64 / 2;
        let jitter_ms = if jitter_ceiling > 0 {
            use rand::Rng;
            rand::thread_rng().gen_range(0..=jitter_ceiling)
        } else {
            0
        };
        exponential + Duration::from_millis(jitter_ms)
    }
}

/// One chat completion request as seen by a backend
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// Transport seam for chat completions. The HTTP implementation talks to an
/// OpenAI-compatible API; tests substitute scripted backends.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run one completion and return the raw message content
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;

    /// Model identifier recorded in call metadata
    fn model(&self) -> &str;
}

/// Metadata about a completed call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMeta {
    pub model: String,
    pub attempts: u32,
    pub elapsed_ms: u64,
}

/// A parsed JSON reply plus call metadata
#[derive(Debug, Clone)]
pub struct JsonReply {
    pub data: serde_json::Value,
    pub meta: CallMeta,
}

// =============================================================================
// HTTP backend (OpenAI-style chat completions)
// =============================================================================

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Backend over an OpenAI-compatible `/v1/chat/completions` endpoint
#[derive(Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpBackend {
    /// Build an HTTP backend. A missing API key is fatal here, before any
    /// request is made.
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<HttpBackend, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("ideaforge/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpBackend {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout { attempts: 1 }
    } else {
        LlmError::Transport(e.to_string())
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatCompletionMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatCompletionMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_reqwest_error)?;

        match status {
            200 => {
                let parsed: ChatCompletionResponse = serde_json::from_str(&text)
                    .map_err(|e| LlmError::Schema(format!("Malformed completion body: {}", e)))?;
                let content = parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message)
                    .and_then(|m| m.content)
                    .unwrap_or_default();
                if content.trim().is_empty() {
                    return Err(LlmError::Schema("Empty response content".to_string()));
                }
                Ok(content)
            }
            401 | 403 => Err(LlmError::InvalidApiKey),
            429 => Err(LlmError::RateLimited),
            _ => Err(LlmError::Provider {
                status,
                body: crate::utils::truncate_text(&text, 500),
            }),
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// =============================================================================
// Structured caller
// =============================================================================

/// The structured caller: one backend plus a retry policy
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn ChatBackend>,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn ChatBackend>) -> LlmClient {
        LlmClient {
            backend,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> LlmClient {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Send a system/user prompt pair and parse the response as JSON.
    ///
    /// Transport failures, timeouts, rate limits, 5xx responses and
    /// JSON-parse failures all count as retryable attempts. Credential
    /// problems and provider 4xx responses surface immediately. No partial
    /// results are returned.
    pub async fn call_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &CallOptions,
    ) -> Result<JsonReply, LlmError> {
        let started = Instant::now();
        let request = ChatRequest {
            system: system_prompt.to_string(),
            user: user_prompt.to_string(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = LlmError::Transport("no attempts were made".to_string());

        for attempt in 1..=max_attempts {
            let outcome =
                match tokio::time::timeout(options.timeout, self.backend.complete(&request)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(LlmError::Timeout { attempts: attempt }),
                };

            let failure = match outcome {
                Ok(content) => {
                    log::debug!(
                        "LLM attempt {}/{} returned {} chars",
                        attempt,
                        max_attempts,
                        content.len()
                    );
                    match serde_json::from_str(extract_json_block(&content)) {
                        Ok(data) => {
                            return Ok(JsonReply {
                                data,
                                meta: CallMeta {
                                    model: self.backend.model().to_string(),
                                    attempts: attempt,
                                    elapsed_ms: started.elapsed().as_millis() as u64,
                                },
                            });
                        }
                        Err(e) => LlmError::Schema(format!("Response was not valid JSON: {}", e)),
                    }
                }
                Err(e) if !e.should_retry() => return Err(e),
                Err(e) => e,
            };

            if attempt < max_attempts {
                let delay = self.retry.delay_for(attempt - 1);
                log::warn!(
                    "LLM attempt {}/{} failed: {}; retrying in {}ms",
                    attempt,
                    max_attempts,
                    failure,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            last_error = failure;
        }

        Err(match last_error {
            LlmError::Timeout { .. } => LlmError::Timeout {
                attempts: max_attempts,
            },
            other => other,
        })
    }

    /// Like `call_json` but deserializes into a typed shape. The
    /// deserialization failure is a schema error surfaced without further
    /// retries: by then the provider produced valid JSON and the shape
    /// mismatch is a validation concern.
    pub async fn call_json_as<T: DeserializeOwned>(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &CallOptions,
    ) -> Result<(T, CallMeta), LlmError> {
        let reply = self.call_json(system_prompt, user_prompt, options).await?;
        let parsed: T = serde_json::from_value(reply.data)
            .map_err(|e| LlmError::Schema(format!("Response shape mismatch: {}", e)))?;
        Ok((parsed, reply.meta))
    }
}
