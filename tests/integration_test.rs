/// Integration tests for the referee CLI
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn compare_cmd(technologies: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("referee").unwrap();
    cmd.arg("compare").args(technologies);
    cmd.args([
        "--team-size",
        "3",
        "--budget",
        "low",
        "--timeline",
        "tight",
        "--scalability",
        "small",
        "--expertise",
        "beginner",
    ]);
    cmd
}

/// REST vs GraphQL under a cost-driven project favors REST
#[test]
fn test_compare_rest_vs_graphql() {
    compare_cmd(&["REST", "GraphQL"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recommendation"))
        .stdout(predicate::str::contains("REST"))
        .stdout(predicate::str::contains("GraphQL"));
}

#[test]
fn test_compare_rejects_single_technology() {
    compare_cmd(&["REST"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid request"));
}

#[test]
fn test_compare_unknown_technology_suggests() {
    compare_cmd(&["REST", "GraphCurl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean"))
        .stderr(predicate::str::contains("GraphQL"));
}

#[test]
fn test_compare_allow_unknown_proceeds() {
    compare_cmd(&["REST", "GraphQL", "FoundryKit"])
        .arg("--allow-unknown")
        .assert()
        .success()
        .stdout(predicate::str::contains("FoundryKit"))
        .stdout(predicate::str::contains("limited data"));
}

#[test]
fn test_compare_markdown_format() {
    compare_cmd(&["PostgreSQL", "MongoDB"])
        .args(["--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "# Technology Comparison: PostgreSQL vs MongoDB",
        ))
        .stdout(predicate::str::contains("## Trade-off Matrix"));
}

#[test]
fn test_compare_json_format_parses() {
    let output = compare_cmd(&["React", "Vue"])
        .args(["--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!(parsed["recommendation"]["ranked_choices"].is_array());
    assert_eq!(parsed["profiles"].as_array().unwrap().len(), 2);
}

/// Identical requests render byte-identical JSON
#[test]
fn test_compare_json_is_idempotent() {
    let run = || {
        compare_cmd(&["React", "Vue", "MongoDB"])
            .args(["--format", "json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_compare_unknown_format_fails() {
    compare_cmd(&["React", "Vue"])
        .args(["--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn test_list_command() {
    Command::cargo_bin("referee")
        .unwrap()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("PostgreSQL"))
        .stdout(predicate::str::contains("GraphQL"));
}

#[test]
fn test_show_command() {
    Command::cargo_bin("referee")
        .unwrap()
        .args(["show", "postgresql"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PostgreSQL"))
        .stdout(predicate::str::contains("Pros"))
        .stdout(predicate::str::contains("Best for"));
}

#[test]
fn test_show_unknown_fails() {
    Command::cargo_bin("referee")
        .unwrap()
        .args(["show", "FoundryKit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in the knowledge base"));
}

/// A knowledge overlay file makes new technologies comparable
#[test]
fn test_knowledge_overlay() {
    let temp_dir = TempDir::new().unwrap();
    let overlay = temp_dir.path().join("extra.json");
    fs::write(
        &overlay,
        r#"[{
            "name": "Fastify",
            "category": "Backend Framework",
            "dimensions": {
                "cost": {"score": 4.5, "explanation": "Open source with no licensing cost"},
                "scalability": {"score": 4.0, "explanation": "Handles high request volumes"},
                "complexity": {"score": 4.0, "explanation": "Minimal API surface"},
                "ecosystem": {"score": 3.5, "explanation": "Growing plugin ecosystem"},
                "performance": {"score": 4.5, "explanation": "One of the fastest Node frameworks"}
            },
            "pros": ["Very fast request handling"],
            "cons": ["Smaller ecosystem than Express"],
            "best_for": ["High-throughput JSON APIs"],
            "metadata": {"maturity": "STABLE", "license": "MIT", "maintainer": "Fastify team"}
        }]"#,
    )
    .unwrap();

    compare_cmd(&["REST", "Fastify"])
        .args(["--knowledge", overlay.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fastify"));
}

#[test]
fn test_custom_dimension_appears_in_matrix() {
    compare_cmd(&["REST", "GraphQL"])
        .args(["--dimension", "community", "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("community"));
}

#[test]
fn test_custom_dimension_colliding_with_standard_fails() {
    compare_cmd(&["REST", "GraphQL"])
        .args(["--dimension", "Cost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dimension name conflict"));
}
