//! Integration tests for the forge binary.
//!
//! These tests verify end-to-end behavior including:
//! - Single-session composition and input validation
//! - Offline weekly plans
//! - Catalog inspection
//! - The saved plan workflow

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from the user's config and API key
fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("forge"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"));
    cmd
}

fn write_catalog(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("exercises.json");
    fs::write(&path, json).expect("Failed to write catalog");
    path
}

const PUSHUPS_AND_SQUATS: &str = r#"[
    {"name": "Push-ups", "type": "strength", "muscle_group": "chest",
     "sets": 3, "reps_per_set": 12, "duration_per_rep_seconds": 3, "rest_between_sets_seconds": 60},
    {"name": "Squats", "type": "strength", "muscle_group": "legs",
     "sets": 3, "reps_per_set": 15, "duration_per_rep_seconds": 3, "rest_between_sets_seconds": 60}
]"#;

const BODYWEIGHT_AND_DUMBBELL: &str = r#"[
    {"name": "Push-ups", "type": "strength", "muscle_group": "chest"},
    {"name": "Dumbbell Curls", "type": "strength", "muscle_group": "arms", "equipment_needed": ["dumbbell"]}
]"#;

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Equipment-aware workout and weekly plan composer",
        ));
}

#[test]
fn test_session_json_fits_budget() {
    let temp_dir = setup_test_dir();
    let output = cli(&temp_dir)
        .args(["session", "--duration", "30", "--seed", "42", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let workout = stdout_json(&output);
    let total = workout["total_duration_minutes"].as_f64().unwrap();
    let exercises = workout["exercises"].as_array().unwrap();

    assert!(total <= 30.0);
    assert!(!exercises.is_empty());
    assert_eq!(workout["exercise_count"].as_u64().unwrap() as usize, exercises.len());
    for exercise in exercises {
        assert!(exercise["equipment_needed"].as_array().unwrap().is_empty());
    }
}

#[test]
fn test_session_is_reproducible_with_seed() {
    let temp_dir = setup_test_dir();
    let run = || {
        cli(&temp_dir)
            .args(["session", "-e", "bodyweight,dumbbells", "-d", "45", "--seed", "7", "--json"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_session_fits_pushups_and_squats() {
    let temp_dir = setup_test_dir();
    let catalog = write_catalog(temp_dir.path(), PUSHUPS_AND_SQUATS);

    let output = cli(&temp_dir)
        .arg("--catalog")
        .arg(&catalog)
        .args(["session", "-e", "bodyweight", "-d", "15", "--seed", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let workout = stdout_json(&output);
    assert_eq!(workout["exercise_count"], 2);
    let total = workout["total_duration_minutes"].as_f64().unwrap();
    assert!((8.0..=8.1).contains(&total), "total was {}", total);
}

#[test]
fn test_session_human_output() {
    let temp_dir = setup_test_dir();
    let catalog = write_catalog(temp_dir.path(), PUSHUPS_AND_SQUATS);

    cli(&temp_dir)
        .arg("--catalog")
        .arg(&catalog)
        .args(["session", "-d", "15", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout: 2 exercises"))
        .stdout(predicate::str::contains("Push-ups"))
        .stdout(predicate::str::contains("Squats"));
}

#[test]
fn test_session_rejects_short_duration() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["session", "-d", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Duration must be between 15 and 90 minutes",
        ));
}

#[test]
fn test_session_rejects_empty_equipment() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["session", "--equipment", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("select at least one equipment"));
}

#[test]
fn test_session_unavailable_equipment() {
    let temp_dir = setup_test_dir();
    let catalog = write_catalog(temp_dir.path(), BODYWEIGHT_AND_DUMBBELL);

    cli(&temp_dir)
        .arg("--catalog")
        .arg(&catalog)
        .args(["session", "-e", "barbell"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "No exercises available for selected equipment",
        ));
}

#[test]
fn test_missing_catalog_yields_no_exercises() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("--catalog")
        .arg(temp_dir.path().join("nope.json"))
        .args(["session"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No exercises available"));
}

#[test]
fn test_week_offline_json() {
    let temp_dir = setup_test_dir();
    let output = cli(&temp_dir)
        .args([
            "week",
            "--goal",
            "Build muscle and strength",
            "--daily-minutes",
            "40",
            "--offline",
            "--seed",
            "3",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan = stdout_json(&output);
    assert_eq!(plan["source"], "fallback");
    assert_eq!(plan["weekly_goal"], "Build muscle and strength");

    let days = plan["daily_workouts"].as_object().unwrap();
    let keys: Vec<&str> = days.keys().map(|k| k.as_str()).collect();
    for day in [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ] {
        assert!(keys.contains(&day), "missing {}", day);
    }
    assert_eq!(days.len(), 7);

    let rest_days = days.values().filter(|d| d["rest_day"] == true).count();
    assert!((1..=2).contains(&rest_days));
    assert_eq!(days["sunday"]["rest_day"], true);
}

#[test]
fn test_week_without_api_key_falls_back() {
    let temp_dir = setup_test_dir();
    let output = cli(&temp_dir)
        .args(["week", "-g", "Improve cardiovascular fitness", "--seed", "5", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan = stdout_json(&output);
    assert_eq!(plan["source"], "fallback");
    assert!(plan["fallback_reason"].is_string());
}

#[test]
fn test_week_human_output() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["week", "-g", "General fitness", "--offline", "--seed", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Weekly plan: General fitness"))
        .stdout(predicate::str::contains("Monday: Upper Body"))
        .stdout(predicate::str::contains("Sunday: Rest and Recovery (rest day)"))
        .stdout(predicate::str::contains("Source: composed locally"));
}

#[test]
fn test_week_without_exercises_reports_it() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("--catalog")
        .arg(temp_dir.path().join("nope.json"))
        .args(["week", "-g", "x", "--offline"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "No exercises available for selected equipment",
        ));
}

#[test]
fn test_week_unavailable_equipment() {
    let temp_dir = setup_test_dir();
    let catalog = write_catalog(temp_dir.path(), BODYWEIGHT_AND_DUMBBELL);

    cli(&temp_dir)
        .arg("--catalog")
        .arg(&catalog)
        .args(["week", "-e", "barbell", "-g", "Tone", "--offline"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No exercises available"));
}

#[test]
fn test_week_requires_goal() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir).args(["week", "--offline"]).assert().failure();

    cli(&temp_dir)
        .args(["week", "--offline", "--goal", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("weekly fitness goal"));
}

#[test]
fn test_goals_and_equipment_listings() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("goals")
        .assert()
        .success()
        .stdout(predicate::str::contains("Build muscle and strength"));

    cli(&temp_dir)
        .arg("equipment")
        .assert()
        .success()
        .stdout(predicate::str::contains("pull_up_bar"))
        .stdout(predicate::str::contains("no equipment needed"));
}

#[test]
fn test_catalog_validate() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["catalog", "--validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Catalog OK: 29 exercises"));

    let catalog = write_catalog(
        temp_dir.path(),
        r#"[
            {"name": "Squats", "type": "strength", "muscle_group": "legs"},
            {"name": "squats", "type": "strength", "muscle_group": "legs"}
        ]"#,
    );
    cli(&temp_dir)
        .arg("--catalog")
        .arg(&catalog)
        .args(["catalog", "--validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate exercise name"));
}

#[test]
fn test_catalog_filter_json() {
    let temp_dir = setup_test_dir();
    let catalog = write_catalog(temp_dir.path(), BODYWEIGHT_AND_DUMBBELL);

    let output = cli(&temp_dir)
        .arg("--catalog")
        .arg(&catalog)
        .args(["catalog", "-e", "bodyweight", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let exercises = stdout_json(&output);
    let names: Vec<&str> = exercises
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Push-ups"]);

    let output = cli(&temp_dir)
        .arg("--catalog")
        .arg(&catalog)
        .args(["catalog", "-e", "dumbbells", "--json"])
        .output()
        .unwrap();
    let exercises = stdout_json(&output);
    let names: Vec<&str> = exercises
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Dumbbell Curls"]);
}

#[test]
fn test_saved_plan_workflow() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["session", "--seed", "9", "--save", "Morning"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 'Morning'"));

    cli(&temp_dir)
        .args(["week", "-g", "Tone", "--offline", "--seed", "9", "--save", "My week", "--json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved 'My week'"));

    assert!(temp_dir.path().join("data/saved_plans.jsonl").exists());

    let output = cli(&temp_dir).args(["plans", "list", "--json"]).output().unwrap();
    let plans = stdout_json(&output);
    let plans = plans.as_array().unwrap();
    assert_eq!(plans.len(), 2);

    let morning = plans
        .iter()
        .find(|p| p["name"] == "Morning")
        .expect("Morning plan missing");
    assert_eq!(morning["plan"]["plan_type"], "single");
    let id = morning["id"].as_str().unwrap().to_string();

    cli(&temp_dir)
        .args(["plans", "favorite", &id[..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marked 'Morning' as favorite"));

    cli(&temp_dir)
        .args(["plans", "show", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Morning *"))
        .stdout(predicate::str::contains("Workout:"));

    cli(&temp_dir)
        .args(["plans", "delete", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 'Morning'"));

    cli(&temp_dir)
        .args(["plans", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("My week"))
        .stdout(predicate::str::contains("Morning").not());
}

#[test]
fn test_plans_unknown_id() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["plans", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved plans."));

    cli(&temp_dir)
        .args(["plans", "show", "deadbeef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No saved plan matches"));
}
