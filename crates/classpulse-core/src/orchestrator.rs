//! Quiz orchestration: live generation first, fallback content otherwise.
//!
//! Per request the flow is START → ATTEMPT_LIVE → {SUCCESS | ATTEMPT_FALLBACK}
//! → DONE. The fallback step cannot fail, so `produce` always returns a quiz.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::fallback::FallbackGenerator;
use crate::model::{QuizResult, Student, StudentContext};
use crate::traits::QuizGenerator;

/// Composes an optional live generator with the offline fallback.
pub struct QuizOrchestrator {
    generator: Option<Arc<dyn QuizGenerator>>,
    fallback: FallbackGenerator,
}

impl QuizOrchestrator {
    pub fn new(generator: Option<Arc<dyn QuizGenerator>>) -> Self {
        Self {
            generator,
            fallback: FallbackGenerator::new(),
        }
    }

    /// An orchestrator that only ever serves fallback content.
    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    /// Whether a live generator is configured.
    pub fn is_live(&self) -> bool {
        self.generator.is_some()
    }

    /// Produce a quiz for `student_id`. Never fails.
    pub async fn produce(
        &self,
        student_id: &str,
        topic: &str,
        count: usize,
        context: &StudentContext,
    ) -> QuizResult {
        let Some(generator) = &self.generator else {
            tracing::warn!(student_id, topic, "no quiz generator configured, serving fallback");
            return self.fallback_quiz(student_id, topic, count);
        };

        match generator.generate(topic, count, context).await {
            Ok(questions) => {
                tracing::info!(
                    student_id,
                    topic,
                    generator = generator.name(),
                    questions = questions.len(),
                    "quiz generated"
                );
                QuizResult::live(student_id, topic, questions)
            }
            Err(failure) => {
                tracing::warn!(
                    student_id,
                    topic,
                    generator = generator.name(),
                    error = %failure,
                    "live generation failed, serving fallback"
                );
                self.fallback_quiz(student_id, topic, count)
            }
        }
    }

    /// Produce a quiz using the student's own context.
    pub async fn produce_for(&self, student: &Student, topic: &str, count: usize) -> QuizResult {
        self.produce(&student.id, topic, count, &student.context()).await
    }

    /// Like [`produce`](Self::produce), but gives up as soon as `cancel` fires.
    ///
    /// Cancellation drops the in-flight call and any pending backoff wait;
    /// `None` means no quiz was produced at all.
    pub async fn produce_until_cancelled(
        &self,
        student_id: &str,
        topic: &str,
        count: usize,
        context: &StudentContext,
        cancel: &CancellationToken,
    ) -> Option<QuizResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(student_id, topic, "quiz request cancelled");
                None
            }
            quiz = self.produce(student_id, topic, count, context) => Some(quiz),
        }
    }

    fn fallback_quiz(&self, student_id: &str, topic: &str, count: usize) -> QuizResult {
        QuizResult::fallback(student_id, topic, self.fallback.generate(topic, count))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{GenerationFailure, ProviderError};
    use crate::model::{OptionLabel, QuizQuestion};

    struct StubGenerator {
        outcome: Result<Vec<QuizQuestion>, GenerationFailure>,
        delay: Duration,
        calls: AtomicU32,
    }

    impl StubGenerator {
        fn succeeding(questions: Vec<QuizQuestion>) -> Self {
            Self {
                outcome: Ok(questions),
                delay: Duration::ZERO,
                calls: AtomicU32::new(0),
            }
        }

        fn failing(failure: GenerationFailure) -> Self {
            Self {
                outcome: Err(failure),
                delay: Duration::ZERO,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl QuizGenerator for StubGenerator {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(
            &self,
            _topic: &str,
            _count: usize,
            _context: &StudentContext,
        ) -> Result<Vec<QuizQuestion>, GenerationFailure> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome.clone()
        }
    }

    fn live_question() -> QuizQuestion {
        QuizQuestion::new(
            "Live question",
            ["1".into(), "2".into(), "3".into(), "4".into()],
            OptionLabel::D,
            "Because.",
            "radicals",
        )
    }

    #[tokio::test]
    async fn no_generator_serves_fallback_with_requested_count() {
        let orchestrator = QuizOrchestrator::fallback_only();
        assert!(!orchestrator.is_live());

        let quiz = orchestrator
            .produce("student-001", "linear_equations", 5, &StudentContext::default())
            .await;
        assert_eq!(quiz.quiz_id, "quiz-student-001-linear_equations-fallback");
        assert!(quiz.is_fallback());
        assert_eq!(quiz.questions.len(), 5);
        assert_eq!(quiz.topic, "Linear Equations");
    }

    #[tokio::test]
    async fn live_success_is_not_tagged() {
        let stub = Arc::new(StubGenerator::succeeding(vec![live_question()]));
        let orchestrator = QuizOrchestrator::new(Some(stub.clone()));

        let quiz = orchestrator
            .produce("student-002", "radicals", 1, &StudentContext::default())
            .await;
        assert_eq!(quiz.quiz_id, "quiz-student-002-radicals");
        assert!(!quiz.is_fallback());
        assert_eq!(quiz.questions[0].question(), "Live question");
        assert_eq!(stub.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn failure_falls_back_without_extra_attempts() {
        let failure = GenerationFailure::from_provider(ProviderError::Status {
            status: 503,
            message: "unavailable".into(),
        });
        let stub = Arc::new(StubGenerator::failing(failure));
        let orchestrator = QuizOrchestrator::new(Some(stub.clone()));

        let quiz = orchestrator
            .produce("student-003", "factoring", 3, &StudentContext::default())
            .await;
        assert!(quiz.is_fallback());
        assert_eq!(quiz.questions.len(), 3);
        assert!(quiz.questions.iter().all(|q| q.topic() == "factoring"));
        assert_eq!(stub.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn missing_credential_failure_falls_back() {
        let stub = Arc::new(StubGenerator::failing(GenerationFailure::missing_credential()));
        let orchestrator = QuizOrchestrator::new(Some(stub));
        let quiz = orchestrator
            .produce("student-004", "exponents", 2, &StudentContext::default())
            .await;
        assert!(quiz.is_fallback());
        assert_eq!(quiz.questions.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_slow_generation() {
        let stub = Arc::new(StubGenerator {
            outcome: Ok(vec![live_question()]),
            delay: Duration::from_secs(60),
            calls: AtomicU32::new(0),
        });
        let orchestrator = QuizOrchestrator::new(Some(stub));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let quiz = orchestrator
            .produce_until_cancelled("student-005", "radicals", 1, &StudentContext::default(), &cancel)
            .await;
        assert!(quiz.is_none());
    }

    #[tokio::test]
    async fn uncancelled_request_completes() {
        let orchestrator = QuizOrchestrator::fallback_only();
        let cancel = CancellationToken::new();
        let quiz = orchestrator
            .produce_until_cancelled("student-006", "radicals", 2, &StudentContext::default(), &cancel)
            .await
            .unwrap();
        assert_eq!(quiz.questions.len(), 2);
    }
}
