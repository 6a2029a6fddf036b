//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the developer's config and credentials.
fn classpulse(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("classpulse").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn write_demo_roster(dir: &TempDir, count: usize) -> std::path::PathBuf {
    let path = dir.path().join("roster.json");
    classpulse(dir)
        .args(["demo", "--output", "roster.json", "--count", &count.to_string()])
        .assert()
        .success();
    path
}

#[test]
fn students_lists_demo_roster() {
    let dir = TempDir::new().unwrap();
    classpulse(&dir)
        .arg("students")
        .assert()
        .success()
        .stdout(predicate::str::contains("student-001"))
        .stdout(predicate::str::contains("30 students"));
}

#[test]
fn student_detail() {
    let dir = TempDir::new().unwrap();
    classpulse(&dir)
        .args(["student", "--id", "student-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(student-001)"))
        .stdout(predicate::str::contains("Risk:"))
        .stdout(predicate::str::contains("Assignment 5"));
}

#[test]
fn unknown_student_fails() {
    let dir = TempDir::new().unwrap();
    classpulse(&dir)
        .args(["student", "--id", "student-999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("student not found: student-999"));
}

#[test]
fn analytics_json() {
    let dir = TempDir::new().unwrap();
    let output = classpulse(&dir)
        .args(["analytics", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let analytics: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(analytics["total_students"], 30);
    let breakdown = &analytics["risk_breakdown"];
    let sum = breakdown["high"].as_u64().unwrap()
        + breakdown["medium"].as_u64().unwrap()
        + breakdown["low"].as_u64().unwrap();
    assert_eq!(sum, 30);
    assert!(analytics["top_struggle_topics"].as_array().unwrap().len() <= 5);
}

#[test]
fn analytics_saves_report() {
    let dir = TempDir::new().unwrap();
    classpulse(&dir)
        .args(["analytics", "--format", "markdown", "--output", "reports/course.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Course Risk Report"));

    let saved = std::fs::read_to_string(dir.path().join("reports/course.json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(report["students"].as_array().unwrap().len(), 30);
}

#[test]
fn analytics_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    classpulse(&dir)
        .args(["analytics", "--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn quiz_without_credential_falls_back() {
    let dir = TempDir::new().unwrap();
    let output = classpulse(&dir)
        .args([
            "quiz",
            "--student",
            "student-003",
            "--topic",
            "quadratic_equations",
            "--count",
            "3",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let quiz: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(quiz["quiz_id"], "quiz-student-003-quadratic_equations-fallback");
    assert_eq!(quiz["topic"], "Quadratic Equations");
    let questions = quiz["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert!(questions.iter().all(|q| q["topic"] == "quadratic_equations"));
}

#[test]
fn quiz_for_unknown_student_fails() {
    let dir = TempDir::new().unwrap();
    classpulse(&dir)
        .args(["quiz", "--student", "nobody", "--topic", "radicals"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("student not found"));
}

#[test]
fn quiz_all_filters_by_level() {
    let dir = TempDir::new().unwrap();
    let roster = write_demo_roster(&dir, 12);
    let output = classpulse(&dir)
        .args(["quiz-all", "--topic", "radicals", "--count", "2", "--level", "high"])
        .arg("--roster")
        .arg(&roster)
        .assert()
        .success()
        .stderr(predicate::str::contains("live, "))
        .get_output()
        .stdout
        .clone();

    let quizzes: Vec<serde_json::Value> = serde_json::from_slice(&output).unwrap();
    assert!(!quizzes.is_empty());
    for quiz in &quizzes {
        assert!(quiz["quiz_id"].as_str().unwrap().ends_with("-fallback"));
        assert_eq!(quiz["questions"].as_array().unwrap().len(), 2);
    }
}

#[test]
fn demo_roster_roundtrips_through_students() {
    let dir = TempDir::new().unwrap();
    let roster = write_demo_roster(&dir, 8);
    assert!(roster.exists());

    classpulse(&dir)
        .arg("students")
        .arg("--roster")
        .arg(&roster)
        .assert()
        .success()
        .stdout(predicate::str::contains("8 students"));
}

#[test]
fn malformed_roster_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
    classpulse(&dir)
        .args(["students", "--roster", "bad.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    classpulse(&dir)
        .args([
            "quiz",
            "--student",
            "student-001",
            "--topic",
            "radicals",
            "--config",
            "missing.toml",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    classpulse(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created classpulse.toml"));

    let content = std::fs::read_to_string(dir.path().join("classpulse.toml")).unwrap();
    assert!(content.contains("[generation]"));
    assert!(content.contains("${ANTHROPIC_API_KEY}"));

    classpulse(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_config_without_key_still_serves_quizzes() {
    let dir = TempDir::new().unwrap();
    classpulse(&dir).arg("init").assert().success();
    classpulse(&dir)
        .args(["quiz", "--student", "student-001", "--topic", "radicals", "--count", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-fallback"));
}
