//! Concurrency tests for the saved plan store.
//!
//! Several forge processes saving at once must not lose or interleave lines.

use assert_cmd::Command;
use std::thread;
use tempfile::TempDir;

fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("forge"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .env_remove("OPENAI_API_KEY")
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"));
    cmd
}

#[test]
fn test_concurrent_saves() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    thread::scope(|scope| {
        for i in 0..5 {
            let temp_dir = &temp_dir;
            scope.spawn(move || {
                let seed = i.to_string();
                let name = format!("plan-{}", i);
                cli(temp_dir)
                    .args(["session", "--seed", seed.as_str(), "--save", name.as_str()])
                    .assert()
                    .success();
            });
        }
    });

    let path = temp_dir.path().join("data/saved_plans.jsonl");
    let content = std::fs::read_to_string(&path).expect("Failed to read plan store");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5, "Expected 5 saved plans, got {}", lines.len());
    for line in lines {
        serde_json::from_str::<serde_json::Value>(line).expect("Interleaved or corrupt line");
    }
}

#[test]
fn test_reads_during_edits() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    for i in 0..3 {
        let seed = i.to_string();
        let name = format!("week-{}", i);
        cli(&temp_dir)
            .args(["week", "-g", "Tone", "--offline", "--seed", seed.as_str()])
            .args(["--save", name.as_str()])
            .assert()
            .success();
    }

    let output = cli(&temp_dir)
        .args(["plans", "list", "--json"])
        .output()
        .unwrap();
    let plans: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<String> = plans
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 3);

    thread::scope(|scope| {
        for id in &ids {
            let temp_dir = &temp_dir;
            scope.spawn(move || {
                cli(temp_dir)
                    .args(["plans", "favorite", id.as_str()])
                    .assert()
                    .success();
            });
            scope.spawn(move || {
                cli(temp_dir).args(["plans", "list"]).assert().success();
            });
        }
    });

    let output = cli(&temp_dir)
        .args(["plans", "list", "--json"])
        .output()
        .unwrap();
    let plans: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let plans = plans.as_array().unwrap();
    assert_eq!(plans.len(), 3);
    for plan in plans {
        assert_eq!(plan["is_favorite"], true, "lost favorite on {}", plan["id"]);
    }
}

#[test]
fn test_deletes_and_saves_interleave() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    for i in 0..4 {
        let seed = i.to_string();
        let name = format!("old-{}", i);
        cli(&temp_dir)
            .args(["session", "--seed", seed.as_str(), "--save", name.as_str()])
            .assert()
            .success();
    }

    let output = cli(&temp_dir)
        .args(["plans", "list", "--json"])
        .output()
        .unwrap();
    let plans: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let old_ids: Vec<String> = plans
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(old_ids.len(), 4);

    thread::scope(|scope| {
        for (i, id) in old_ids.iter().enumerate() {
            let temp_dir = &temp_dir;
            scope.spawn(move || {
                cli(temp_dir)
                    .args(["plans", "delete", id.as_str()])
                    .assert()
                    .success();
            });
            scope.spawn(move || {
                let name = format!("new-{}", i);
                cli(temp_dir)
                    .args(["session", "--save", name.as_str()])
                    .assert()
                    .success();
            });
        }
    });

    let output = cli(&temp_dir)
        .args(["plans", "list", "--json"])
        .output()
        .unwrap();
    let plans: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let mut names: Vec<String> = plans
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["new-0", "new-1", "new-2", "new-3"]);
}
