//! Anthropic Messages API transport.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use classpulse_core::error::{GenerationFailure, ProviderError};
use classpulse_core::traits::{CompletionRequest, CompletionTransport};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// One POST to `{base_url}/v1/messages` per call. Never retries.
pub struct AnthropicTransport {
    api_key: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl AnthropicTransport {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationFailure> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationFailure::configuration(format!("HTTP client: {e}")))?;

        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Parse a `retry-after` header given in whole or fractional seconds.
fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

#[async_trait]
impl CompletionTransport for AnthropicTransport {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout.as_secs())
                } else {
                    ProviderError::Connection(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            return Err(ProviderError::RateLimited { retry_after });
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ProviderError::Status { status, message });
        }

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.timeout.as_secs())
            } else {
                ProviderError::Connection(e.to_string())
            }
        })?;
        let parsed: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::MalformedResponse(format!("response envelope: {e}")))?;

        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| ProviderError::MalformedResponse("no text content in response".into()))
    }
}
