use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::fixture_source;

/// The binary isolated from the user's global config and log settings
fn phrasegen(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("phrasegen").unwrap();
    cmd.env("PHRASEGEN_CONFIG", config_dir.path().join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn message_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[test]
fn test_version() {
    let temp = TempDir::new().unwrap();
    phrasegen(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_run_generates_requested_count() {
    let temp = TempDir::new().unwrap();
    let output = phrasegen(&temp)
        .args(["run", "-f", &fixture_source("pronouns.yaml"), "-n", "3", "--seed", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines = message_lines(&output.stdout);
    assert_eq!(lines.len(), 3);
    for line in &lines {
        assert!(line.ends_with(" would come."), "{line}");
    }
    // Each message is followed by a blank line
    assert_eq!(stdout.matches("\n\n").count(), 3);
}

#[test]
fn test_run_seed_is_reproducible() {
    let temp = TempDir::new().unwrap();
    let args = ["run", "-f", &fixture_source("weather.yaml"), "-n", "4", "--seed", "11"];

    let first = phrasegen(&temp).args(args).output().unwrap();
    let second = phrasegen(&temp).args(args).output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_run_verbose_prints_initial_state() {
    let temp = TempDir::new().unwrap();
    phrasegen(&temp)
        .args(["-v", "run", "-f", &fixture_source("pronouns.yaml"), "-s", "Gender=Female"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("---- state ----\nGender: Female\n"))
        .stdout(predicate::str::contains("said she would come."));
}

#[test]
fn test_run_json_output() {
    let temp = TempDir::new().unwrap();
    let output = phrasegen(&temp)
        .args([
            "run",
            "-f",
            &fixture_source("pronouns.yaml"),
            "-n",
            "2",
            "-s",
            "Gender=Male",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["root"], "Root");
    assert_eq!(json["state"]["Gender"], "Male");
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    for message in messages {
        assert!(message.as_str().unwrap().ends_with("said he would come."));
    }
}

#[test]
fn test_run_max_length_flag() {
    let temp = TempDir::new().unwrap();
    let output = phrasegen(&temp)
        .args(["run", "-f", &fixture_source("weather.yaml"), "-n", "3", "--max-length", "16"])
        .output()
        .unwrap();
    assert!(output.status.success());
    for line in message_lines(&output.stdout) {
        assert!(line.ends_with(" all day."), "{line}");
    }
}

#[test]
fn test_run_unknown_root_suggests_types() {
    let temp = TempDir::new().unwrap();
    phrasegen(&temp)
        .args(["run", "-f", &fixture_source("pronouns.yaml"), "--root", "Pronon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'Pronon' not found"))
        .stderr(predicate::str::contains("Did you mean: Pronoun?"));
}

#[test]
fn test_run_invalid_state() {
    let temp = TempDir::new().unwrap();
    phrasegen(&temp)
        .args(["run", "-f", &fixture_source("pronouns.yaml"), "-s", "Gender"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected key=value"));
}

#[test]
fn test_run_missing_file() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.yaml");
    phrasegen(&temp)
        .args(["run", "-f", missing.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read definitions file"));
}

#[test]
fn test_run_invalid_constraint_key() {
    let temp = TempDir::new().unwrap();
    phrasegen(&temp)
        .args(["run", "-f", &fixture_source("invalid_key.yaml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid constraint key 'Gender!?'"));
}

#[test]
fn test_run_uses_global_config_defaults() {
    let temp = TempDir::new().unwrap();
    let config = format!(
        "file = {:?}\nroot = \"LastName\"\nnum = 2\n",
        fixture_source("pronouns.yaml")
    );
    std::fs::write(temp.path().join("config.toml"), config).unwrap();

    let output = phrasegen(&temp).args(["run", "--seed", "2"]).output().unwrap();
    assert!(output.status.success());

    let mut lines = message_lines(&output.stdout);
    lines.sort();
    assert_eq!(lines, ["Jones", "Smith"]);
}

#[test]
fn test_run_flags_override_global_config() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), "root = \"Missing\"\nnum = 5\n").unwrap();

    let output = phrasegen(&temp)
        .args(["run", "-f", &fixture_source("pronouns.yaml"), "--root", "LastName", "-n", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(message_lines(&output.stdout).len(), 1);
}

#[test]
fn test_validate_valid_file() {
    let temp = TempDir::new().unwrap();
    phrasegen(&temp)
        .args(["validate", &fixture_source("pronouns.yaml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("FirstName (2 definition(s))"))
        .stdout(predicate::str::contains("✓ Definitions are valid"));
}

#[test]
fn test_validate_reports_warnings() {
    let temp = TempDir::new().unwrap();
    phrasegen(&temp)
        .args(["validate", &fixture_source("cyclic.yaml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("'Pong' references undefined type 'Missing'"))
        .stdout(predicate::str::contains("Reference cycle between Ping, Pong"));
}

#[test]
fn test_validate_strict_fails_on_warnings() {
    let temp = TempDir::new().unwrap();
    phrasegen(&temp)
        .args(["validate", "--strict", &fixture_source("cyclic.yaml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 warning(s)"));
}

#[test]
fn test_validate_invalid_file() {
    let temp = TempDir::new().unwrap();
    phrasegen(&temp)
        .args(["validate", &fixture_source("invalid_key.yaml")])
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗ Definition 2 ('Name')"));
}

#[test]
fn test_validate_json() {
    let temp = TempDir::new().unwrap();
    let output = phrasegen(&temp)
        .args(["validate", "--format", "json", &fixture_source("cyclic.yaml")])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["definitions"]["Pong"], 1);
    assert_eq!(json["cycles"][0][0], "Ping");
    assert_eq!(json["undefined_references"][0]["target"], "Missing");
}

#[test]
fn test_validate_missing_file_json() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.yaml");
    let output = phrasegen(&temp)
        .args(["validate", "--format", "json", missing.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], false);
    assert!(json["errors"][0].as_str().unwrap().contains("Failed to read definitions file"));
}
