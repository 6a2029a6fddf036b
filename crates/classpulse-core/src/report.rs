//! Course report types with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::{compute_course_analytics, CourseAnalytics};
use crate::model::Student;
use crate::risk::{RiskLevel, RiskReason};

/// A point-in-time snapshot of a course's risk picture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub analytics: CourseAnalytics,
    /// Students ordered from highest to lowest risk.
    pub students: Vec<StudentSummary>,
}

/// Summary of a student (without the assignment history).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_reasons: Vec<RiskReason>,
    pub struggling_topics: Vec<String>,
}

impl From<&Student> for StudentSummary {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            risk_score: student.risk_score(),
            risk_level: student.risk_level(),
            risk_reasons: student.risk_reasons().to_vec(),
            struggling_topics: student.struggling_topics().to_vec(),
        }
    }
}

impl CourseReport {
    pub fn build(students: &[Student]) -> Self {
        let mut summaries: Vec<StudentSummary> = students.iter().map(StudentSummary::from).collect();
        summaries.sort_by(|a, b| b.risk_score.cmp(&a.risk_score).then_with(|| a.id.cmp(&b.id)));
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            analytics: compute_course_analytics(students),
            students: summaries,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: CourseReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Render as a markdown document.
    pub fn to_markdown(&self) -> String {
        let a = &self.analytics;
        let mut md = String::new();
        md.push_str("# Course Risk Report\n\n");
        md.push_str(&format!(
            "Generated {}\n\n",
            self.created_at.format("%Y-%m-%d %H:%M UTC")
        ));
        md.push_str(&format!(
            "- Students: {}\n- At risk: {}\n- High / Medium / Low: {} / {} / {}\n- Average risk score: {:.1}\n\n",
            a.total_students,
            a.at_risk_count,
            a.risk_breakdown.high,
            a.risk_breakdown.medium,
            a.risk_breakdown.low,
            a.avg_risk_score,
        ));

        if !a.top_struggle_topics.is_empty() {
            md.push_str("## Top Struggle Topics\n\n| Topic | Students |\n|---|---|\n");
            for tc in &a.top_struggle_topics {
                md.push_str(&format!("| {} | {} |\n", tc.topic, tc.count));
            }
            md.push('\n');
        }

        let flagged: Vec<&StudentSummary> = self
            .students
            .iter()
            .filter(|s| s.risk_level != RiskLevel::Low)
            .collect();
        if !flagged.is_empty() {
            md.push_str("## Students At Risk\n\n| Student | Score | Level | Reasons |\n|---|---|---|---|\n");
            for s in flagged {
                let reasons: Vec<&str> = s.risk_reasons.iter().map(|r| r.tag()).collect();
                md.push_str(&format!(
                    "| {} ({}) | {} | {} | {} |\n",
                    s.name,
                    s.id,
                    s.risk_score,
                    s.risk_level,
                    reasons.join(", ")
                ));
            }
        }

        md
    }
}
