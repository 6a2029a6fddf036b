//! The `classpulse student` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{find_student, load_roster};

pub fn execute(id: String, roster_path: Option<PathBuf>) -> Result<()> {
    let roster = load_roster(roster_path.as_deref())?;
    let student = find_student(&roster, &id)?;

    println!("{} ({})", student.name, student.id);
    println!("  Email:       {}", student.email);
    println!("  Course:      {}", student.course_id);
    println!(
        "  Last active: {}",
        student.last_active.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "  Risk:        {} ({})",
        student.risk_score(),
        student.risk_level().to_string().to_uppercase()
    );

    let context = student.context();
    println!("  Average:     {}", context.grade_average_display());
    println!("  Struggling:  {}", context.struggling_topics_display());

    if !student.risk_reasons().is_empty() {
        println!("\nRisk factors:");
        for reason in student.risk_reasons() {
            println!("  +{:>2}  {}  ({})", reason.points(), reason.describe(), reason.tag());
        }
    }

    if !student.assignments().is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Assignment", "Score", "Attempts", "Minutes", "Topics", "Submitted"]);
        for a in student.assignments() {
            table.add_row(vec![
                Cell::new(&a.name),
                Cell::new(format!("{:.0}%", a.score)),
                Cell::new(a.attempts),
                Cell::new(a.time_spent_minutes),
                Cell::new(a.topics.join(", ")),
                Cell::new(a.submitted_at.format("%Y-%m-%d")),
            ]);
        }
        println!("\n{table}");
    }

    Ok(())
}
