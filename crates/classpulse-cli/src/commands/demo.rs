//! The `classpulse demo` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;

use classpulse_core::analytics::compute_course_analytics;
use classpulse_core::demo::generate_demo_roster;
use classpulse_core::roster::Roster;

pub fn execute(output: PathBuf, count: usize, seed: u64) -> Result<()> {
    let students = generate_demo_roster(count, seed, Utc::now());
    let analytics = compute_course_analytics(&students);
    Roster::new(students).save_json(&output)?;

    println!(
        "Wrote {} students to {} ({} at risk)",
        analytics.total_students,
        output.display(),
        analytics.at_risk_count
    );
    Ok(())
}
