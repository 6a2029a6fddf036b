//! classpulse-providers: Live quiz generation.
//!
//! Implements `CompletionTransport` for the Anthropic Messages API and wraps
//! it in a `GenerationClient` that retries transient failures with capped
//! exponential backoff before handing a single failure to the orchestrator.

pub mod anthropic;
pub mod config;
pub mod generation;
pub mod mock;
pub mod retry;

pub use anthropic::AnthropicTransport;
pub use config::{build_orchestrator, load_config_from, ClasspulseConfig, GenerationConfig};
pub use generation::GenerationClient;
pub use retry::RetryPolicy;
