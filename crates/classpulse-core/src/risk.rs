//! Additive risk scoring.
//!
//! Each signal clause contributes points independently; the total is capped
//! at [`MAX_RISK_SCORE`]. Scoring is pure given the assignment history, the
//! last-active timestamp and "now".

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Assignment, Student};

pub const MAX_RISK_SCORE: u8 = 100;

/// Assumed class-average minutes per assignment.
pub const CLASS_AVERAGE_MINUTES: u32 = 60;

/// Topics whose mean score falls below this are "struggling".
pub const STRUGGLING_THRESHOLD: f64 = 70.0;

/// How many of the latest assignments the trend clause looks at.
const TREND_WINDOW: usize = 4;
const TREND_MIN_SAMPLES: usize = 3;

/// Coarse risk bucket derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Step function over the score; lower bounds are inclusive.
    pub fn from_score(score: u8) -> Self {
        if score >= 41 {
            RiskLevel::High
        } else if score >= 21 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// A signal that contributed points to a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskReason {
    #[serde(rename = "declining_grades")]
    DecliningGrades,
    #[serde(rename = "grade_below_60")]
    GradeBelow60,
    #[serde(rename = "grade_below_70")]
    GradeBelow70,
    #[serde(rename = "multiple_attempts_5plus")]
    MultipleAttempts5Plus,
    #[serde(rename = "multiple_attempts_3plus")]
    MultipleAttempts3Plus,
    #[serde(rename = "inactive_7plus_days")]
    Inactive7PlusDays,
    #[serde(rename = "inactive_5plus_days")]
    Inactive5PlusDays,
    #[serde(rename = "excessive_time")]
    ExcessiveTime,
}

impl RiskReason {
    /// Points this signal adds to the score.
    pub fn points(self) -> u8 {
        match self {
            RiskReason::DecliningGrades => 20,
            RiskReason::GradeBelow60 => 25,
            RiskReason::GradeBelow70 => 15,
            RiskReason::MultipleAttempts5Plus => 15,
            RiskReason::MultipleAttempts3Plus => 10,
            RiskReason::Inactive7PlusDays => 15,
            RiskReason::Inactive5PlusDays => 10,
            RiskReason::ExcessiveTime => 10,
        }
    }

    /// Stable tag used in JSON output.
    pub fn tag(self) -> &'static str {
        match self {
            RiskReason::DecliningGrades => "declining_grades",
            RiskReason::GradeBelow60 => "grade_below_60",
            RiskReason::GradeBelow70 => "grade_below_70",
            RiskReason::MultipleAttempts5Plus => "multiple_attempts_5plus",
            RiskReason::MultipleAttempts3Plus => "multiple_attempts_3plus",
            RiskReason::Inactive7PlusDays => "inactive_7plus_days",
            RiskReason::Inactive5PlusDays => "inactive_5plus_days",
            RiskReason::ExcessiveTime => "excessive_time",
        }
    }

    /// Sentence shown to instructors.
    pub fn describe(self) -> &'static str {
        match self {
            RiskReason::DecliningGrades => "Grades have declined across recent assignments",
            RiskReason::GradeBelow60 => "Latest grade is below 60%",
            RiskReason::GradeBelow70 => "Latest grade is below 70%",
            RiskReason::MultipleAttempts5Plus => "Needed 5 or more attempts on the latest assignment",
            RiskReason::MultipleAttempts3Plus => "Needed 3 or more attempts on the latest assignment",
            RiskReason::Inactive7PlusDays => "Inactive for more than 7 days",
            RiskReason::Inactive5PlusDays => "Inactive for more than 5 days",
            RiskReason::ExcessiveTime => "Spent more than twice the class average on the latest assignment",
        }
    }
}

impl fmt::Display for RiskReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Derived risk fields for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_reasons: Vec<RiskReason>,
    pub struggling_topics: Vec<String>,
}

impl RiskAssessment {
    pub fn evaluate(
        assignments: &[Assignment],
        last_active: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let (risk_score, risk_reasons) = calculate_risk_score(assignments, last_active, now);
        Self {
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            risk_reasons,
            struggling_topics: struggling_topics(assignments),
        }
    }
}

/// Score a student against the wall clock.
pub fn score_student(student: &Student) -> (u8, Vec<RiskReason>) {
    calculate_risk_score(student.assignments(), student.last_active, Utc::now())
}

/// Compute the risk score (0–100) and the reasons that fired, in clause order.
pub fn calculate_risk_score(
    assignments: &[Assignment],
    last_active: DateTime<Utc>,
    now: DateTime<Utc>,
) -> (u8, Vec<RiskReason>) {
    let Some(latest) = assignments.last() else {
        return (0, Vec::new());
    };

    let mut reasons = Vec::new();

    let window_start = assignments.len().saturating_sub(TREND_WINDOW);
    let recent: Vec<f64> = assignments[window_start..].iter().map(|a| a.score).collect();
    if is_declining(&recent) {
        reasons.push(RiskReason::DecliningGrades);
    }

    if latest.score < 60.0 {
        reasons.push(RiskReason::GradeBelow60);
    } else if latest.score < 70.0 {
        reasons.push(RiskReason::GradeBelow70);
    }

    if latest.attempts >= 5 {
        reasons.push(RiskReason::MultipleAttempts5Plus);
    } else if latest.attempts >= 3 {
        reasons.push(RiskReason::MultipleAttempts3Plus);
    }

    let days_inactive = (now - last_active).num_days();
    if days_inactive > 7 {
        reasons.push(RiskReason::Inactive7PlusDays);
    } else if days_inactive > 5 {
        reasons.push(RiskReason::Inactive5PlusDays);
    }

    if latest.time_spent_minutes > CLASS_AVERAGE_MINUTES * 2 {
        reasons.push(RiskReason::ExcessiveTime);
    }

    let total: u32 = reasons.iter().map(|r| u32::from(r.points())).sum();
    let score = total.min(u32::from(MAX_RISK_SCORE)) as u8;
    (score, reasons)
}

/// True when there are at least three grades and none rises above its predecessor.
pub fn is_declining(grades: &[f64]) -> bool {
    grades.len() >= TREND_MIN_SAMPLES && grades.windows(2).all(|w| w[1] <= w[0])
}

/// Topics whose mean score is below [`STRUGGLING_THRESHOLD`], in first-seen order.
pub fn struggling_topics(assignments: &[Assignment]) -> Vec<String> {
    // (topic, sum, count), kept in insertion order
    let mut totals: Vec<(&str, f64, u32)> = Vec::new();
    for assignment in assignments {
        for topic in &assignment.topics {
            match totals.iter_mut().find(|(t, _, _)| *t == topic.as_str()) {
                Some(entry) => {
                    entry.1 += assignment.score;
                    entry.2 += 1;
                }
                None => totals.push((topic.as_str(), assignment.score, 1)),
            }
        }
    }

    totals
        .into_iter()
        .filter(|(_, sum, count)| sum / f64::from(*count) < STRUGGLING_THRESHOLD)
        .map(|(topic, _, _)| topic.to_string())
        .collect()
}
