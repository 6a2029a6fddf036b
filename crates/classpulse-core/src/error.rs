//! Generation error types.
//!
//! [`ProviderError`] is the closed set of things that can go wrong on a single
//! call to the remote generation service. It lives in `classpulse-core` so that
//! retry decisions are an exhaustive match rather than string inspection.
//! [`GenerationFailure`] is what callers see once retrying is over.

use std::time::Duration;

use thiserror::Error;

/// Status codes worth another attempt.
pub const RETRYABLE_STATUS_CODES: [u16; 6] = [429, 500, 502, 503, 504, 529];

/// Errors from one attempt against the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The connection could not be established or was dropped.
    #[error("network error: {0}")]
    Connection(String),

    /// The call exceeded its per-request timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The service asked us to slow down.
    #[error("rate limited")]
    RateLimited { retry_after: Option<Duration> },

    /// The service answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    /// The body was not valid JSON or did not match the question schema.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Anything else.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ProviderError {
    /// Whether another attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Connection(_)
            | ProviderError::Timeout(_)
            | ProviderError::RateLimited { .. } => true,
            ProviderError::Status { status, .. } => RETRYABLE_STATUS_CODES.contains(status),
            ProviderError::MalformedResponse(_) | ProviderError::Unexpected(_) => false,
        }
    }

    /// The upstream retry-after hint, if one was supplied.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ProviderError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Connection(_) | ProviderError::Timeout(_) => {
                "Unable to connect to the AI service. Please check your internet connection and try again.".to_string()
            }
            ProviderError::RateLimited { .. } => {
                "You've made too many requests. Please wait a moment and try again.".to_string()
            }
            ProviderError::Status { status, .. } => match status {
                401 => "API authentication failed. Please check your API key configuration.".to_string(),
                403 => "Access denied. Your API key may not have the required permissions.".to_string(),
                404 => "The requested AI model is not available.".to_string(),
                429 => "Service is experiencing high demand. Please try again in a moment.".to_string(),
                500 | 502 | 503 | 504 => {
                    "The AI service encountered an internal error. Please try again later.".to_string()
                }
                529 => "The AI service is temporarily overloaded. Please try again in a few minutes.".to_string(),
                other => format!("The AI service returned an error (code {other}). Please try again."),
            },
            ProviderError::MalformedResponse(_) => {
                "Received an invalid response from the AI service. Please try again.".to_string()
            }
            ProviderError::Unexpected(_) => {
                "An unexpected error occurred while generating the quiz. Please try again.".to_string()
            }
        }
    }
}

/// The single failure value a generator surfaces to its caller.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GenerationFailure {
    message: String,
    #[source]
    cause: Option<ProviderError>,
    retry_after: Option<Duration>,
}

impl GenerationFailure {
    /// Build the final failure from the last classified error.
    pub fn from_provider(error: ProviderError) -> Self {
        Self {
            message: error.user_message(),
            retry_after: error.retry_after(),
            cause: Some(error),
        }
    }

    /// No credential was configured for the generation service.
    pub fn missing_credential() -> Self {
        Self {
            message: "AI API key is not configured. Please set ANTHROPIC_API_KEY in your environment."
                .to_string(),
            cause: None,
            retry_after: None,
        }
    }

    /// The client could not be set up for a reason other than the credential.
    pub fn configuration(detail: impl Into<String>) -> Self {
        Self {
            message: format!("AI service is misconfigured: {}", detail.into()),
            cause: None,
            retry_after: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&ProviderError> {
        self.cause.as_ref()
    }

    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }
}

impl From<ProviderError> for GenerationFailure {
    fn from(error: ProviderError) -> Self {
        Self::from_provider(error)
    }
}
