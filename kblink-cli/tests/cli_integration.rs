//! Integration tests for the kblink CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get the path to a test fixture
fn fixture_path(name: &str) -> String {
    format!("tests/fixtures/{}", name)
}

fn link_cmd(input: &str) -> Command {
    let mut cmd = Command::cargo_bin("kblink").unwrap();
    cmd.arg("link")
        .arg("-i")
        .arg(input)
        .arg("--vocabulary")
        .arg(fixture_path("vocabulary.json"))
        .arg("-q");
    cmd
}

#[test]
fn test_link_text_output() {
    link_cmd(&fixture_path("obama.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("# tests/fixtures/obama.json"))
        .stdout(predicate::str::contains(
            "Barack Obama\thttp://example.org/Barack_Obama\tExact\t1.000\t1",
        ))
        .stdout(predicate::str::contains(
            "Paris\thttp://example.org/Paris\tExact",
        ));
}

#[test]
fn test_link_json_output() {
    let output = link_cmd(&fixture_path("obama.json"))
        .arg("-f")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entities = &value[0]["entities"];
    assert_eq!(entities.as_array().unwrap().len(), 2);
    assert_eq!(entities[0]["selected_text"], "Barack Obama");
    assert_eq!(entities[0]["types"][0], "http://example.org/Person");
    assert_eq!(entities[0]["occurrences"][0]["context"], "Barack Obama visited Paris.");
    assert_eq!(entities[1]["occurrences"][0]["start"], 21);
    assert_eq!(value[0]["stats"]["linked_entities"], 2);
}

#[test]
fn test_link_markdown_output() {
    link_cmd(&fixture_path("obama.json"))
        .arg("-f")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("| Text | Entity | Match | Score | Occurrences |"))
        .stdout(predicate::str::contains("*Total linked entities: 2*"));
}

#[test]
fn test_link_glob_pattern_in_order() {
    let output = link_cmd(&fixture_path("[co]*.json"))
        .arg("-f")
        .arg("json")
        .arg("-t")
        .arg("2")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let sources: Vec<_> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["source"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        sources,
        vec!["tests/fixtures/cities.json", "tests/fixtures/obama.json"]
    );
    let cities: Vec<_> = value[0]["entities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["selected_text"].as_str().unwrap())
        .collect();
    assert_eq!(cities, vec!["Paris", "Berlin"]);
}

#[test]
fn test_link_to_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("links.md");

    link_cmd(&fixture_path("obama.json"))
        .arg("-f")
        .arg("markdown")
        .arg("-o")
        .arg(&output_path)
        .assert()
        .success();

    let content = fs::read_to_string(&output_path).unwrap();
    assert!(content.starts_with("## tests/fixtures/obama.json"));
}

fn paris_suggestions(vocabulary: &std::path::Path, preset: Option<&str>) -> usize {
    let mut cmd = Command::cargo_bin("kblink").unwrap();
    cmd.arg("link")
        .arg("-i")
        .arg(fixture_path("obama.json"))
        .arg("--vocabulary")
        .arg(vocabulary)
        .arg("-f")
        .arg("json")
        .arg("-q");
    if let Some(preset) = preset {
        cmd.arg("--preset").arg(preset);
    }
    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    value[0]["entities"][0]["suggestions"]
        .as_array()
        .unwrap()
        .len()
}

#[test]
fn test_link_strict_preset_drops_ties() {
    let temp_dir = TempDir::new().unwrap();
    let vocabulary = temp_dir.path().join("vocabulary.json");
    let entries: Vec<_> = (1..=4)
        .map(|i| format!(r#"{{ "id": "urn:paris-{i}", "labels": [{{ "text": "Paris" }}] }}"#))
        .collect();
    fs::write(&vocabulary, format!("[{}]", entries.join(","))).unwrap();

    assert_eq!(paris_suggestions(&vocabulary, None), 4);
    assert_eq!(paris_suggestions(&vocabulary, Some("strict")), 3);
}

#[test]
fn test_link_missing_input() {
    link_cmd("tests/fixtures/does-not-exist-*.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_link_invalid_document() {
    let temp_dir = TempDir::new().unwrap();
    let document = temp_dir.path().join("plain.json");
    fs::write(&document, "Barack Obama visited Paris.").unwrap();

    link_cmd(&document.display().to_string())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid document"));
}

#[test]
fn test_link_missing_vocabulary() {
    let mut cmd = Command::cargo_bin("kblink").unwrap();
    cmd.arg("link")
        .arg("-i")
        .arg(fixture_path("obama.json"))
        .arg("--vocabulary")
        .arg("tests/fixtures/missing.json");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load vocabulary"));
}

#[test]
fn test_validate_config() {
    let temp_dir = TempDir::new().unwrap();
    let valid = temp_dir.path().join("valid.toml");
    let invalid = temp_dir.path().join("invalid.toml");
    fs::write(&valid, "[linker]\nmax_suggestions = 5\n").unwrap();
    fs::write(&invalid, "[linker]\nmax_search_tokens = 0\n").unwrap();

    let mut cmd = Command::cargo_bin("kblink").unwrap();
    cmd.arg("validate").arg("-c").arg(&valid);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("✓ Configuration is valid!"));

    let mut cmd = Command::cargo_bin("kblink").unwrap();
    cmd.arg("validate").arg("-c").arg(&invalid);
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("✗ Configuration is invalid!"))
        .stderr(predicate::str::contains("max_search_tokens"));
}

#[test]
fn test_generate_config_then_validate() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("kblink.toml");

    let mut cmd = Command::cargo_bin("kblink").unwrap();
    cmd.arg("generate-config")
        .arg("-o")
        .arg(&output_path)
        .arg("--preset")
        .arg("lenient");
    cmd.assert().success();

    let mut cmd = Command::cargo_bin("kblink").unwrap();
    cmd.arg("validate").arg("-c").arg(&output_path);
    cmd.assert().success();
}

#[test]
fn test_generate_config_stdout() {
    let mut cmd = Command::cargo_bin("kblink").unwrap();
    cmd.arg("generate-config");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("redirect_mode = \"ignore\""));
}

#[test]
fn test_list_formats() {
    let mut cmd = Command::cargo_bin("kblink").unwrap();
    cmd.arg("list").arg("formats");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("text"))
        .stdout(predicate::str::contains("json"))
        .stdout(predicate::str::contains("markdown"));
}

#[test]
fn test_list_presets() {
    let mut cmd = Command::cargo_bin("kblink").unwrap();
    cmd.arg("list").arg("presets");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("strict"))
        .stdout(predicate::str::contains("lenient"));
}

#[test]
fn test_debug_log_reports_stats_once() {
    let output = Command::cargo_bin("kblink")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("link")
        .arg("-i")
        .arg(fixture_path("obama.json"))
        .arg("--vocabulary")
        .arg(fixture_path("vocabulary.json"))
        .arg("-vv")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("linked 2 texts").count(), 1);
}
