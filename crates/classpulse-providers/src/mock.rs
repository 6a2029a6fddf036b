//! Mock transport for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use classpulse_core::error::ProviderError;
use classpulse_core::traits::{CompletionRequest, CompletionTransport};

/// A scripted transport for exercising the generation client without a network.
///
/// Each call pops the next scripted outcome; once the script runs dry every
/// call gets the default outcome.
pub struct MockTransport {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    default_outcome: Result<String, ProviderError>,
    call_count: AtomicU32,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockTransport {
    /// Play back `script` in order, then keep answering with `fallback`.
    pub fn new(
        script: impl IntoIterator<Item = Result<String, ProviderError>>,
        fallback: Result<String, ProviderError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            default_outcome: fallback,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Always answer with the same text.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::new([], Ok(response.to_string()))
    }

    /// Always fail with the same error.
    pub fn always_failing(error: ProviderError) -> Self {
        Self::new([], Err(error))
    }

    /// Number of calls made to this transport.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request received.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CompletionTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(request.clone());

        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.default_outcome.clone())
    }
}
