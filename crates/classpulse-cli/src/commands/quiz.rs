//! The `classpulse quiz` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{find_student, load_roster};

pub async fn execute(
    student_id: String,
    topic: String,
    count: usize,
    roster_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let roster = load_roster(roster_path.as_deref())?;
    let student = find_student(&roster, &student_id)?;

    let config = classpulse_providers::load_config_from(config_path.as_deref())?;
    let orchestrator = classpulse_providers::build_orchestrator(&config)?;

    let quiz = orchestrator.produce_for(&student, &topic, count).await;
    if quiz.is_fallback() {
        eprintln!("Live generation unavailable, served a practice quiz from the offline pool.");
    }
    println!("{}", serde_json::to_string_pretty(&quiz)?);
    Ok(())
}
