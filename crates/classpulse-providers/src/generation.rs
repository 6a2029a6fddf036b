//! Live quiz generation: prompting, retries with backoff, and response parsing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use classpulse_core::error::{GenerationFailure, ProviderError};
use classpulse_core::model::{topic_display, QuizQuestion, StudentContext};
use classpulse_core::traits::{
    strip_code_fence, CompletionRequest, CompletionTransport, QuizGenerator,
};

use crate::anthropic::AnthropicTransport;
use crate::config::GenerationConfig;
use crate::retry::RetryPolicy;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

const PREVIEW_CHARS: usize = 200;

/// Generates quizzes through a [`CompletionTransport`], retrying transient failures.
pub struct GenerationClient {
    transport: Arc<dyn CompletionTransport>,
    policy: RetryPolicy,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("transport", &self.transport.name())
            .field("policy", &self.policy)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GenerationClient {
    /// Build a client talking to the Anthropic API.
    ///
    /// Fails if the credential is empty or whitespace, or if the retry and
    /// timeout settings are out of range.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationFailure> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationFailure::missing_credential());
        }

        let initial_delay = Duration::try_from_secs_f64(config.initial_retry_delay_secs)
            .map_err(|e| GenerationFailure::configuration(format!("initial_retry_delay_secs: {e}")))?;
        let timeout = Duration::from_secs(config.request_timeout_secs);
        if timeout.is_zero() {
            return Err(GenerationFailure::configuration(
                "request_timeout_secs must be positive",
            ));
        }

        let transport = AnthropicTransport::new(&config.api_key, config.base_url.clone(), timeout)?;
        info!(
            model = %config.model,
            max_retries = config.max_retries,
            "generation client initialised"
        );

        let policy = RetryPolicy::new(config.max_retries, initial_delay);
        Ok(Self::with_transport(Arc::new(transport), policy)
            .with_model(config.model.clone(), config.max_tokens))
    }

    /// Build a client over any transport, with the default model.
    pub fn with_transport(transport: Arc<dyn CompletionTransport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>, max_tokens: u32) -> Self {
        self.model = model.into();
        self.max_tokens = max_tokens;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl QuizGenerator for GenerationClient {
    fn name(&self) -> &str {
        self.transport.name()
    }

    async fn generate(
        &self,
        topic: &str,
        count: usize,
        context: &StudentContext,
    ) -> Result<Vec<QuizQuestion>, GenerationFailure> {
        let request = CompletionRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            prompt: build_prompt(topic, count, context),
        };
        let max_attempts = self.policy.max_attempts();
        let mut retry_after = None;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            if attempt > 1 {
                let delay = self.policy.next_delay(attempt - 1, retry_after);
                info!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }

            info!(attempt, max_attempts, topic, "calling generation service");
            let error = match self.transport.complete(&request).await {
                Ok(text) => match parse_questions(&text, count) {
                    Ok(questions) => {
                        info!(attempt, questions = questions.len(), "quiz questions parsed");
                        return Ok(questions);
                    }
                    Err(e) => {
                        let preview: String = text.chars().take(PREVIEW_CHARS).collect();
                        debug!(%preview, "unparseable response");
                        e
                    }
                },
                Err(e) => e,
            };

            if error.is_retryable() && attempt < max_attempts {
                warn!(attempt, max_attempts, error = %error, "retryable generation error");
                retry_after = error.retry_after();
                continue;
            }

            if error.is_retryable() {
                error!(attempt, error = %error, "retry budget exhausted");
            } else {
                error!(attempt, error = %error, "fatal generation error, not retrying");
            }
            return Err(GenerationFailure::from_provider(error));
        }
    }
}

/// The instruction sent to the model for one quiz.
pub fn build_prompt(topic: &str, count: usize, context: &StudentContext) -> String {
    format!(
        r#"Generate {count} multiple-choice algebra questions about {display} for a high school student.

Student context:
- Current grade average: {average}
- Struggling with: {struggling}

Requirements:
1. Pitch the difficulty at this student's level
2. Give exactly 4 options labelled A, B, C and D
3. Explain the correct answer in detail
4. Mention the math concepts the explanation relies on

Respond with ONLY a JSON array in this exact shape, with no markdown and no other text:
[
  {{
    "question": "Solve for x: 2x + 5 = 13",
    "options": {{"A": "x = 3", "B": "x = 4", "C": "x = 5", "D": "x = 6"}},
    "correct": "B",
    "explanation": "Subtract 5 from both sides to get 2x = 8, then divide by 2: x = 4.",
    "topic": "{topic}"
  }}
]"#,
        display = topic_display(topic),
        average = context.grade_average_display(),
        struggling = context.struggling_topics_display(),
    )
}

/// Parse a model response into questions.
///
/// A wrapping code fence is removed first. Anything that is not an array of
/// well-formed questions, or an empty array when questions were requested, is
/// a [`ProviderError::MalformedResponse`].
pub fn parse_questions(raw: &str, count: usize) -> Result<Vec<QuizQuestion>, ProviderError> {
    let body = strip_code_fence(raw);
    let questions: Vec<QuizQuestion> = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
    if questions.is_empty() && count > 0 {
        return Err(ProviderError::MalformedResponse(
            "response contained no questions".into(),
        ));
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use classpulse_core::model::OptionLabel;

    const TWO_QUESTIONS: &str = r#"[
      {"question": "Solve 2x = 4", "options": {"A": "1", "B": "2", "C": "3", "D": "4"},
       "correct": "B", "explanation": "Divide by 2.", "topic": "linear_equations"},
      {"question": "Solve x + 1 = 3", "options": {"A": "2", "B": "3", "C": "4", "D": "5"},
       "correct": "A", "explanation": "Subtract 1.", "topic": "linear_equations"}
    ]"#;

    fn client(transport: Arc<MockTransport>, max_retries: u32) -> GenerationClient {
        GenerationClient::with_transport(transport, RetryPolicy::new(max_retries, Duration::ZERO))
    }

    fn unavailable() -> ProviderError {
        ProviderError::Status {
            status: 503,
            message: "unavailable".into(),
        }
    }

    #[test]
    fn prompt_carries_topic_and_context() {
        let context = StudentContext {
            grade_average: Some(71.6),
            struggling_topics: vec!["radicals".into(), "factoring".into()],
        };
        let prompt = build_prompt("quadratic_equations", 3, &context);
        assert!(prompt.starts_with("Generate 3 multiple-choice algebra questions about Quadratic Equations"));
        assert!(prompt.contains("Current grade average: 72%"));
        assert!(prompt.contains("Struggling with: radicals, factoring"));
        assert!(prompt.contains("\"topic\": \"quadratic_equations\""));
        assert!(prompt.contains("ONLY a JSON array"));
    }

    #[test]
    fn prompt_uses_na_without_context() {
        let prompt = build_prompt("radicals", 1, &StudentContext::default());
        assert!(prompt.contains("Current grade average: N/A"));
        assert!(prompt.contains("Struggling with: N/A"));
    }

    #[test]
    fn parses_fenced_response() {
        let fenced = format!("```json\n{TWO_QUESTIONS}\n```");
        let questions = parse_questions(&fenced, 2).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct(), OptionLabel::B);
        assert_eq!(questions[1].option(OptionLabel::A), "2");
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        assert!(matches!(
            parse_questions("not json", 1),
            Err(ProviderError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_questions("[]", 1),
            Err(ProviderError::MalformedResponse(_))
        ));
        let three_options = r#"[{"question": "q", "options": {"A": "1", "B": "2", "C": "3"},
            "correct": "A", "explanation": "e", "topic": "t"}]"#;
        assert!(parse_questions(three_options, 1).is_err());
        let bad_label = r#"[{"question": "q", "options": {"A": "1", "B": "2", "C": "3", "D": "4"},
            "correct": "E", "explanation": "e", "topic": "t"}]"#;
        assert!(parse_questions(bad_label, 1).is_err());
        assert!(parse_questions("[]", 0).unwrap().is_empty());
    }

    #[test]
    fn missing_credential_is_rejected() {
        for key in ["", "   "] {
            let config = GenerationConfig {
                api_key: key.into(),
                ..GenerationConfig::default()
            };
            let err = GenerationClient::new(&config).unwrap_err();
            assert!(err.message().contains("ANTHROPIC_API_KEY"));
        }
    }

    #[test]
    fn negative_retry_delay_is_rejected() {
        let config = GenerationConfig {
            api_key: "sk-test".into(),
            initial_retry_delay_secs: -1.0,
            ..GenerationConfig::default()
        };
        let err = GenerationClient::new(&config).unwrap_err();
        assert!(err.message().contains("initial_retry_delay_secs"));
    }

    #[test]
    fn builds_from_config() {
        let config = GenerationConfig {
            api_key: "sk-test".into(),
            model: "claude-haiku".into(),
            max_retries: 5,
            ..GenerationConfig::default()
        };
        let client = GenerationClient::new(&config).unwrap();
        assert_eq!(client.model(), "claude-haiku");
        assert_eq!(client.policy().max_attempts(), 6);
        assert_eq!(client.name(), "anthropic");
    }

    #[tokio::test]
    async fn success_on_first_attempt() {
        let transport = Arc::new(MockTransport::with_fixed_response(TWO_QUESTIONS));
        let questions = client(transport.clone(), 3)
            .generate("linear_equations", 2, &StudentContext::default())
            .await
            .unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(transport.call_count(), 1);
        let request = transport.last_request().unwrap();
        assert_eq!(request.model, DEFAULT_MODEL);
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[tokio::test]
    async fn persistent_retryable_error_uses_whole_budget() {
        let transport = Arc::new(MockTransport::always_failing(unavailable()));
        let failure = client(transport.clone(), 3)
            .generate("radicals", 2, &StudentContext::default())
            .await
            .unwrap_err();
        assert_eq!(transport.call_count(), 4);
        assert!(failure.message().contains("internal error"));
        assert!(matches!(failure.cause(), Some(ProviderError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn recovers_after_transient_errors() {
        let transport = Arc::new(MockTransport::new(
            [
                Err(ProviderError::Connection("reset".into())),
                Err(ProviderError::Timeout(30)),
            ],
            Ok(TWO_QUESTIONS.to_string()),
        ));
        let questions = client(transport.clone(), 3)
            .generate("linear_equations", 2, &StudentContext::default())
            .await
            .unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn malformed_json_is_not_retried() {
        let transport = Arc::new(MockTransport::with_fixed_response("Sure! Here are your questions"));
        let failure = client(transport.clone(), 3)
            .generate("radicals", 2, &StudentContext::default())
            .await
            .unwrap_err();
        assert_eq!(transport.call_count(), 1);
        assert!(failure.message().contains("invalid response"));
    }

    #[tokio::test]
    async fn fatal_status_is_not_retried() {
        for status in [400, 401, 403, 404] {
            let transport = Arc::new(MockTransport::always_failing(ProviderError::Status {
                status,
                message: String::new(),
            }));
            let failure = client(transport.clone(), 3)
                .generate("radicals", 1, &StudentContext::default())
                .await
                .unwrap_err();
            assert_eq!(transport.call_count(), 1, "status {status}");
            assert!(failure.retry_after().is_none());
        }
    }

    #[tokio::test]
    async fn unexpected_error_is_fatal() {
        let transport = Arc::new(MockTransport::always_failing(ProviderError::Unexpected(
            "boom".into(),
        )));
        let failure = client(transport.clone(), 3)
            .generate("radicals", 1, &StudentContext::default())
            .await
            .unwrap_err();
        assert_eq!(transport.call_count(), 1);
        assert!(failure.message().contains("unexpected"));
    }

    #[tokio::test]
    async fn zero_retries_means_single_call() {
        let transport = Arc::new(MockTransport::always_failing(unavailable()));
        client(transport.clone(), 0)
            .generate("radicals", 1, &StudentContext::default())
            .await
            .unwrap_err();
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn exhausted_rate_limit_surfaces_retry_after() {
        let transport = Arc::new(MockTransport::always_failing(ProviderError::RateLimited {
            retry_after: Some(Duration::ZERO),
        }));
        let failure = client(transport.clone(), 2)
            .generate("radicals", 1, &StudentContext::default())
            .await
            .unwrap_err();
        assert_eq!(transport.call_count(), 3);
        assert_eq!(failure.retry_after(), Some(Duration::ZERO));
        assert!(failure.message().contains("too many requests"));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_waits_grow_between_attempts() {
        let transport = Arc::new(MockTransport::new(
            [Err(unavailable()), Err(unavailable())],
            Ok(TWO_QUESTIONS.to_string()),
        ));
        let client = GenerationClient::with_transport(
            transport.clone(),
            RetryPolicy::new(3, Duration::from_secs(1)),
        );
        let start = tokio::time::Instant::now();
        client
            .generate("linear_equations", 2, &StudentContext::default())
            .await
            .unwrap();
        let waited = start.elapsed();
        // 1s + 2s of base delay plus at most 10% jitter each.
        assert!(waited >= Duration::from_secs(3), "{waited:?}");
        assert!(waited < Duration::from_secs_f64(3.3 + 0.01), "{waited:?}");
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_hint_sets_minimum_wait() {
        let transport = Arc::new(MockTransport::new(
            [Err(ProviderError::RateLimited {
                retry_after: Some(Duration::from_secs(5)),
            })],
            Ok(TWO_QUESTIONS.to_string()),
        ));
        let start = tokio::time::Instant::now();
        client(transport.clone(), 3)
            .generate("linear_equations", 2, &StudentContext::default())
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
        assert_eq!(transport.call_count(), 2);
    }
}
