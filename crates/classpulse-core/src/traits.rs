//! Core trait definitions for quiz generators and completion transports.
//!
//! `classpulse-providers` implements both: a transport performs exactly one
//! remote call, a generator wraps it with prompting, retries and parsing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationFailure, ProviderError};
use crate::model::{QuizQuestion, StudentContext};

// ---------------------------------------------------------------------------
// Quiz generator trait
// ---------------------------------------------------------------------------

/// Something that can produce quiz questions for a topic, possibly remotely.
#[async_trait]
pub trait QuizGenerator: Send + Sync {
    /// Human-readable generator name (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Generate `count` questions on `topic`, personalised with `context`.
    async fn generate(
        &self,
        topic: &str,
        count: usize,
        context: &StudentContext,
    ) -> Result<Vec<QuizQuestion>, GenerationFailure>;
}

// ---------------------------------------------------------------------------
// Completion transport trait
// ---------------------------------------------------------------------------

/// One outbound text-completion call. Implementations never retry.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    fn name(&self) -> &str;

    /// Send the request and return the completion text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

/// Request for a single text completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "claude-sonnet-4-20250514").
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// The user prompt.
    pub prompt: String,
}

// ---------------------------------------------------------------------------
// Code fence stripping
// ---------------------------------------------------------------------------

/// Remove a fenced code block wrapped around a model response.
///
/// Handles ```` ``` ```` and ```` ```json ```` openers, with or without a
/// closing fence. Text that doesn't start with a fence is returned trimmed.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    let body = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    body.trim()
}
