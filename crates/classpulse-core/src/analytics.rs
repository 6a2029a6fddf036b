//! Course-wide aggregates over per-student risk outputs.

use serde::{Deserialize, Serialize};

use crate::model::Student;
use crate::risk::RiskLevel;

/// How many struggling topics the analytics view reports.
pub const TOP_TOPIC_LIMIT: usize = 5;

/// Aggregate risk statistics for a roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseAnalytics {
    pub total_students: usize,
    /// Students at HIGH or MEDIUM risk.
    pub at_risk_count: usize,
    pub risk_breakdown: RiskBreakdown,
    /// Most frequent struggling topics, highest count first.
    pub top_struggle_topics: Vec<TopicCount>,
    /// Mean risk score rounded to one decimal.
    pub avg_risk_score: f64,
}

/// Student counts per risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskBreakdown {
    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

/// Compute course analytics from students' derived risk fields.
pub fn compute_course_analytics(students: &[Student]) -> CourseAnalytics {
    let mut breakdown = RiskBreakdown::default();
    for student in students {
        match student.risk_level() {
            RiskLevel::High => breakdown.high += 1,
            RiskLevel::Medium => breakdown.medium += 1,
            RiskLevel::Low => breakdown.low += 1,
        }
    }

    let mut topic_counts: Vec<TopicCount> = Vec::new();
    for topic in students.iter().flat_map(|s| s.struggling_topics()) {
        match topic_counts.iter_mut().find(|tc| &tc.topic == topic) {
            Some(tc) => tc.count += 1,
            None => topic_counts.push(TopicCount {
                topic: topic.clone(),
                count: 1,
            }),
        }
    }
    // Stable sort keeps first-seen order among ties.
    topic_counts.sort_by(|a, b| b.count.cmp(&a.count));
    topic_counts.truncate(TOP_TOPIC_LIMIT);

    let total = students.len();
    let avg_risk_score = if total == 0 {
        0.0
    } else {
        let sum: u32 = students.iter().map(|s| u32::from(s.risk_score())).sum();
        round_one_decimal(f64::from(sum) / total as f64)
    };

    CourseAnalytics {
        total_students: total,
        at_risk_count: breakdown.high + breakdown.medium,
        risk_breakdown: breakdown,
        top_struggle_topics: topic_counts,
        avg_risk_score,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
