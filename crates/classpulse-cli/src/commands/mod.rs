//! Subcommand implementations.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use classpulse_core::demo::{generate_demo_roster, DEFAULT_ROSTER_SIZE};
use classpulse_core::model::Student;
use classpulse_core::roster::Roster;

pub mod analytics;
pub mod demo;
pub mod init;
pub mod quiz;
pub mod quiz_all;
pub mod student;
pub mod students;

/// Seed for the roster synthesized when no `--roster` is given.
pub const DEMO_SEED: u64 = 42;

/// Load the roster file, or synthesize the demo roster when none is given.
pub fn load_roster(path: Option<&Path>) -> Result<Roster> {
    match path {
        Some(path) => {
            let roster = Roster::load_json(path)?;
            tracing::info!(path = %path.display(), students = roster.len(), "roster loaded");
            Ok(roster)
        }
        None => {
            let students = generate_demo_roster(DEFAULT_ROSTER_SIZE, DEMO_SEED, Utc::now());
            tracing::info!(students = students.len(), "using synthesized demo roster");
            Ok(Roster::new(students))
        }
    }
}

/// Look up a student or fail with a not-found error.
pub fn find_student(roster: &Roster, id: &str) -> Result<Student> {
    roster
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("student not found: {id}"))
}

/// Comma-joined reason tags, or "-" when there are none.
pub fn reason_tags(student: &Student) -> String {
    if student.risk_reasons().is_empty() {
        return "-".to_string();
    }
    student
        .risk_reasons()
        .iter()
        .map(|r| r.tag())
        .collect::<Vec<_>>()
        .join(", ")
}
