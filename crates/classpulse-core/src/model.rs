//! Core data model types for classpulse.
//!
//! Students own their assignments; the risk fields on a [`Student`] are
//! derived by [`crate::risk`] and can only be refreshed, never set directly.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::risk::{RiskAssessment, RiskLevel, RiskReason};

/// Suffix appended to a quiz identifier when fallback content was used.
pub const FALLBACK_SUFFIX: &str = "-fallback";

/// Course assigned to students that don't specify one.
pub const DEFAULT_COURSE_ID: &str = "math-101";

/// A graded assignment submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Unique identifier (e.g. "assignment-3").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Score in the range 0–100.
    pub score: f64,
    /// Number of attempts before submission (at least 1).
    pub attempts: u32,
    /// Minutes spent on the assignment.
    pub time_spent_minutes: u32,
    /// Topic tags covered by the assignment, in authoring order.
    #[serde(default)]
    pub topics: Vec<String>,
    /// When the assignment was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl Assignment {
    /// Check the value ranges an assignment must respect.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.score) {
            return Err(format!(
                "assignment '{}' has score {} outside 0-100",
                self.id, self.score
            ));
        }
        if self.attempts == 0 {
            return Err(format!("assignment '{}' has zero attempts", self.id));
        }
        Ok(())
    }
}

/// A student and their derived risk profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StudentRecord")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub course_id: String,
    pub last_active: DateTime<Utc>,
    assignments: Vec<Assignment>,
    #[serde(flatten)]
    assessment: RiskAssessment,
}

/// The stored shape of a student, without derived fields.
#[derive(Debug, Clone, Deserialize)]
struct StudentRecord {
    id: String,
    name: String,
    email: String,
    #[serde(default = "default_course_id")]
    course_id: String,
    last_active: DateTime<Utc>,
    #[serde(default)]
    assignments: Vec<Assignment>,
}

fn default_course_id() -> String {
    DEFAULT_COURSE_ID.to_string()
}

impl From<StudentRecord> for Student {
    fn from(record: StudentRecord) -> Self {
        let mut student = Student::new(
            record.id,
            record.name,
            record.email,
            record.last_active,
            record.assignments,
            Utc::now(),
        );
        student.course_id = record.course_id;
        student
    }
}

impl Student {
    /// Create a student and compute their risk profile as of `now`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        last_active: DateTime<Utc>,
        assignments: Vec<Assignment>,
        now: DateTime<Utc>,
    ) -> Self {
        let assessment = RiskAssessment::evaluate(&assignments, last_active, now);
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            course_id: default_course_id(),
            last_active,
            assignments,
            assessment,
        }
    }

    /// Assignments in submission order.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn risk_score(&self) -> u8 {
        self.assessment.risk_score
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.assessment.risk_level
    }

    pub fn risk_reasons(&self) -> &[RiskReason] {
        &self.assessment.risk_reasons
    }

    pub fn struggling_topics(&self) -> &[String] {
        &self.assessment.struggling_topics
    }

    /// Append a new submission and recompute the risk profile.
    pub fn record_assignment(&mut self, assignment: Assignment, now: DateTime<Utc>) {
        if assignment.submitted_at > self.last_active {
            self.last_active = assignment.submitted_at;
        }
        self.assignments.push(assignment);
        self.refresh(now);
    }

    /// Recompute derived fields as of `now`.
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        self.assessment = RiskAssessment::evaluate(&self.assignments, self.last_active, now);
    }

    /// Mean of all assignment scores, if any.
    pub fn grade_average(&self) -> Option<f64> {
        if self.assignments.is_empty() {
            return None;
        }
        let total: f64 = self.assignments.iter().map(|a| a.score).sum();
        Some(total / self.assignments.len() as f64)
    }

    /// Personalization context handed to quiz generation.
    pub fn context(&self) -> StudentContext {
        StudentContext {
            grade_average: self.grade_average(),
            struggling_topics: self.struggling_topics().to_vec(),
        }
    }
}

/// What the quiz generator knows about the student it is writing for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentContext {
    pub grade_average: Option<f64>,
    #[serde(default)]
    pub struggling_topics: Vec<String>,
}

impl StudentContext {
    pub fn grade_average_display(&self) -> String {
        match self.grade_average {
            Some(avg) => format!("{avg:.0}%"),
            None => "N/A".to_string(),
        }
    }

    pub fn struggling_topics_display(&self) -> String {
        if self.struggling_topics.is_empty() {
            "N/A".to_string()
        } else {
            self.struggling_topics.join(", ")
        }
    }
}

/// Label of a multiple-choice option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        };
        f.write_str(s)
    }
}

impl FromStr for OptionLabel {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(OptionLabel::A),
            "B" => Ok(OptionLabel::B),
            "C" => Ok(OptionLabel::C),
            "D" => Ok(OptionLabel::D),
            other => Err(QuestionError::UnknownLabel(other.to_string())),
        }
    }
}

/// Why a question failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("expected 4 options, got {0}")]
    WrongOptionCount(usize),

    #[error("unknown option label '{0}'")]
    UnknownLabel(String),
}

/// A four-option multiple-choice question.
///
/// Always holds exactly the options A–D, so `correct` is always one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQuizQuestion")]
pub struct QuizQuestion {
    question: String,
    options: BTreeMap<OptionLabel, String>,
    correct: OptionLabel,
    explanation: String,
    topic: String,
}

/// Unvalidated wire shape of a question.
#[derive(Debug, Deserialize)]
struct RawQuizQuestion {
    question: String,
    options: BTreeMap<String, String>,
    correct: String,
    explanation: String,
    topic: String,
}

impl TryFrom<RawQuizQuestion> for QuizQuestion {
    type Error = QuestionError;

    fn try_from(raw: RawQuizQuestion) -> Result<Self, Self::Error> {
        if raw.options.len() != 4 {
            return Err(QuestionError::WrongOptionCount(raw.options.len()));
        }
        // Four distinct keys that each parse to a label cover A-D exactly once.
        let options = raw
            .options
            .into_iter()
            .map(|(label, text)| label.parse::<OptionLabel>().map(|label| (label, text)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self {
            question: raw.question,
            options,
            correct: raw.correct.parse()?,
            explanation: raw.explanation,
            topic: raw.topic,
        })
    }
}

impl QuizQuestion {
    /// Build a question from its four options in A–D order.
    pub fn new(
        question: impl Into<String>,
        options: [String; 4],
        correct: OptionLabel,
        explanation: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            options: OptionLabel::ALL.into_iter().zip(options).collect(),
            correct,
            explanation: explanation.into(),
            topic: topic.into(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &BTreeMap<OptionLabel, String> {
        &self.options
    }

    pub fn option(&self, label: OptionLabel) -> &str {
        self.options.get(&label).map(String::as_str).unwrap_or_default()
    }

    pub fn correct(&self) -> OptionLabel {
        self.correct
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// A generated quiz for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub quiz_id: String,
    pub student_id: String,
    /// Human-readable topic (e.g. "Linear Equations").
    pub topic: String,
    pub questions: Vec<QuizQuestion>,
}

impl QuizResult {
    /// Wrap live-generated questions.
    pub fn live(student_id: &str, topic: &str, questions: Vec<QuizQuestion>) -> Self {
        Self {
            quiz_id: quiz_id(student_id, topic),
            student_id: student_id.to_string(),
            topic: topic_display(topic),
            questions,
        }
    }

    /// Wrap fallback questions; the identifier carries the fallback suffix.
    pub fn fallback(student_id: &str, topic: &str, questions: Vec<QuizQuestion>) -> Self {
        Self {
            quiz_id: format!("{}{FALLBACK_SUFFIX}", quiz_id(student_id, topic)),
            student_id: student_id.to_string(),
            topic: topic_display(topic),
            questions,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.quiz_id.ends_with(FALLBACK_SUFFIX)
    }
}

/// Quiz identifier for a student and raw topic tag.
pub fn quiz_id(student_id: &str, topic: &str) -> String {
    format!("quiz-{student_id}-{topic}")
}

/// Turn a topic tag like `linear_equations` into `Linear Equations`.
pub fn topic_display(topic: &str) -> String {
    let mut out = String::with_capacity(topic.len());
    let mut prev_is_letter = false;
    for c in topic.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
