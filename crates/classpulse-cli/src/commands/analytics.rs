//! The `classpulse analytics` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use classpulse_core::report::CourseReport;

use super::load_roster;

pub fn execute(
    roster_path: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let roster = load_roster(roster_path.as_deref())?;
    let report = CourseReport::build(&roster.list());

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report.analytics)?),
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "text" => print_text(&report),
        other => anyhow::bail!("unknown format: {other} (expected text, json or markdown)"),
    }

    if let Some(path) = output {
        report.save_json(&path)?;
        eprintln!("Report saved to {}", path.display());
    }

    Ok(())
}

fn print_text(report: &CourseReport) {
    let a = &report.analytics;
    println!("Total students:     {}", a.total_students);
    println!("At risk:            {}", a.at_risk_count);
    println!(
        "High / Medium / Low: {} / {} / {}",
        a.risk_breakdown.high, a.risk_breakdown.medium, a.risk_breakdown.low
    );
    println!("Average risk score: {:.1}", a.avg_risk_score);

    if a.top_struggle_topics.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Struggle topic", "Students"]);
    for tc in &a.top_struggle_topics {
        table.add_row(vec![Cell::new(&tc.topic), Cell::new(tc.count)]);
    }
    println!("\n{table}");
}
