//! classpulse-core: Risk scoring and resilient quiz orchestration.
//!
//! This crate defines the data model, the risk scorer, course analytics, the
//! in-memory roster, offline fallback quizzes, and the orchestrator that ties
//! a live [`traits::QuizGenerator`] to the fallback.

pub mod analytics;
pub mod demo;
pub mod error;
pub mod fallback;
pub mod model;
pub mod orchestrator;
pub mod report;
pub mod risk;
pub mod roster;
pub mod traits;

pub use error::{GenerationFailure, ProviderError};
pub use model::{Assignment, OptionLabel, QuizQuestion, QuizResult, Student, StudentContext};
pub use orchestrator::QuizOrchestrator;
pub use risk::{RiskLevel, RiskReason};
