//! The `classpulse quiz-all` command.
//!
//! Generates one quiz per matching student, bounded by a semaphore. Ctrl-C
//! cancels whatever has not finished; finished quizzes are still printed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use classpulse_core::model::QuizResult;
use classpulse_core::risk::RiskLevel;

use super::load_roster;

pub async fn execute(
    topic: String,
    count: usize,
    level: Option<RiskLevel>,
    parallelism: Option<usize>,
    roster_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let roster = load_roster(roster_path.as_deref())?;
    let config = classpulse_providers::load_config_from(config_path.as_deref())?;
    let orchestrator = Arc::new(classpulse_providers::build_orchestrator(&config)?);
    let parallelism = parallelism.unwrap_or(config.generation.parallelism).max(1);

    let students: Vec<_> = roster
        .list()
        .into_iter()
        .filter(|s| level.map_or(true, |l| s.risk_level() == l))
        .collect();
    tracing::info!(
        students = students.len(),
        parallelism,
        topic = %topic,
        "generating quizzes"
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling outstanding quizzes");
            on_interrupt.cancel();
        }
    });

    let semaphore = Arc::new(Semaphore::new(parallelism));
    let mut futures = FuturesUnordered::new();
    for student in students {
        let orchestrator = Arc::clone(&orchestrator);
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        let topic = topic.clone();

        futures.push(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
            let quiz = orchestrator
                .produce_until_cancelled(&student.id, &topic, count, &student.context(), &cancel)
                .await;
            Ok::<Option<QuizResult>, anyhow::Error>(quiz)
        });
    }

    let mut quizzes = Vec::new();
    let mut cancelled = 0usize;
    while let Some(outcome) = futures.next().await {
        match outcome? {
            Some(quiz) => quizzes.push(quiz),
            None => cancelled += 1,
        }
    }
    quizzes.sort_by(|a, b| a.student_id.cmp(&b.student_id));

    let fallback = quizzes.iter().filter(|q| q.is_fallback()).count();
    println!("{}", serde_json::to_string_pretty(&quizzes)?);
    eprintln!(
        "{} quizzes ({} live, {} fallback){}",
        quizzes.len(),
        quizzes.len() - fallback,
        fallback,
        if cancelled > 0 {
            format!(", {cancelled} cancelled")
        } else {
            String::new()
        }
    );
    Ok(())
}
