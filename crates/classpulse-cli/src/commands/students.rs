//! The `classpulse students` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{load_roster, reason_tags};

pub fn execute(roster_path: Option<PathBuf>) -> Result<()> {
    let roster = load_roster(roster_path.as_deref())?;
    let mut students = roster.list();
    students.sort_by(|a, b| b.risk_score().cmp(&a.risk_score()).then_with(|| a.id.cmp(&b.id)));

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Risk", "Level", "Reasons"]);
    for student in &students {
        table.add_row(vec![
            Cell::new(&student.id),
            Cell::new(&student.name),
            Cell::new(student.risk_score()),
            Cell::new(student.risk_level().to_string().to_uppercase()),
            Cell::new(reason_tags(student)),
        ]);
    }

    println!("{table}");
    println!("{} students", students.len());
    Ok(())
}
