//! In-memory student registry.
//!
//! The roster owns every [`Student`]; readers get clones, so scoring and quiz
//! generation never hold the lock. Nothing here is persisted; the JSON helpers
//! only import and export snapshots.

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::model::{Assignment, Student};

#[derive(Debug, Default)]
pub struct Roster {
    students: RwLock<Vec<Student>>,
}

impl Roster {
    pub fn new(students: Vec<Student>) -> Self {
        Self {
            students: RwLock::new(students),
        }
    }

    /// Snapshot of every student, in roster order.
    pub fn list(&self) -> Vec<Student> {
        self.students
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<Student> {
        self.students
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.students
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a student, replacing any existing one with the same id.
    pub fn upsert(&self, student: Student) {
        let mut students = self.students.write().unwrap_or_else(PoisonError::into_inner);
        match students.iter_mut().find(|s| s.id == student.id) {
            Some(existing) => *existing = student,
            None => students.push(student),
        }
    }

    /// Append an assignment to a student and return the recomputed record.
    pub fn record_assignment(
        &self,
        id: &str,
        assignment: Assignment,
        now: DateTime<Utc>,
    ) -> Option<Student> {
        let mut students = self.students.write().unwrap_or_else(PoisonError::into_inner);
        let student = students.iter_mut().find(|s| s.id == id)?;
        student.record_assignment(assignment, now);
        Some(student.clone())
    }

    /// Recompute every student's derived fields as of `now`.
    pub fn refresh_all(&self, now: DateTime<Utc>) {
        let mut students = self.students.write().unwrap_or_else(PoisonError::into_inner);
        for student in students.iter_mut() {
            student.refresh(now);
        }
    }

    /// Load a roster from a JSON array of students.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read roster from {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("failed to parse roster: {}", path.display()))
    }

    /// Parse a roster from JSON (useful for testing).
    pub fn from_json_str(content: &str) -> Result<Self> {
        let students: Vec<Student> = serde_json::from_str(content).context("invalid roster JSON")?;
        for student in &students {
            for assignment in student.assignments() {
                assignment
                    .validate()
                    .map_err(|e| anyhow::anyhow!("student '{}': {e}", student.id))?;
            }
        }
        let mut seen = std::collections::HashSet::new();
        for student in &students {
            anyhow::ensure!(seen.insert(student.id.as_str()), "duplicate student id: {}", student.id);
        }
        Ok(Self::new(students))
    }

    /// Write a snapshot of the roster, derived fields included.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.list()).context("failed to serialize roster")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write roster to {}", path.display()))?;
        Ok(())
    }
}
