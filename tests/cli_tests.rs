use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SCENARIO: &str = "\
# one stream, one market
streamer start-attendance 30
alice mark
bob mark
alice mark
streamer create-market 2 Boss fight first try?
alice bet 0
bob bet 1
streamer close
carol bet 0
streamer unravel 1
";

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn streamledger(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("streamledger").expect("binary built");
    cmd.env("HOME", home)
        .env_remove("STREAMLEDGER_ADMIN")
        .env_remove("RUST_LOG")
        .arg("--color")
        .arg("never");
    cmd
}

#[test]
fn cli_run_reports_accepted_and_rejected_operations() {
    let dir = TempDir::new().expect("temp dir");
    let script = write(&dir, "scenario.txt", SCENARIO);

    streamledger(dir.path())
        .args(["run", "--script"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("already marked attendance"))
        .stdout(predicate::str::contains("is closed"))
        .stdout(predicate::str::contains("8 accepted, 2 rejected"))
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("Total supply"));
}

#[test]
fn cli_run_json_summary_has_final_balances() {
    let dir = TempDir::new().expect("temp dir");
    let script = write(&dir, "scenario.txt", SCENARIO);

    let output = streamledger(dir.path())
        .args(["--json", "run", "--script"])
        .arg(&script)
        .output()
        .expect("run streamledger");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let summary = stdout
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).expect("JSON line"))
        .find(|value| value["type"] == "summary")
        .expect("summary line");
    let payload = &summary["payload"];

    assert_eq!(payload["accepted"], 8);
    assert_eq!(payload["rejected"], 2);
    assert_eq!(payload["balances"]["alice"], 9);
    assert_eq!(payload["balances"]["bob"], 11);
    assert_eq!(payload["total_supply"], 20);
    assert_eq!(payload["retained"], 0);
}

#[test]
fn cli_run_reads_script_from_stdin() {
    let dir = TempDir::new().expect("temp dir");

    streamledger(dir.path())
        .args(["--json", "run"])
        .write_stdin("streamer start-attendance\nviewer mark\nviewer balance\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("viewer holds 10"));
}

#[test]
fn cli_run_prints_events_as_json_lines() {
    let dir = TempDir::new().expect("temp dir");
    let script = write(&dir, "scenario.txt", "streamer start-attendance 5\nv mark\n");

    streamledger(dir.path())
        .args(["--quiet", "run", "--events", "--script"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"event\":\"attendance_rewarded\""));
}

#[test]
fn cli_run_refuses_malformed_script() {
    let dir = TempDir::new().expect("temp dir");
    let script = write(&dir, "bad.txt", "streamer start-attendance\nalice teleport 3\n");

    streamledger(dir.path())
        .args(["run", "--script"])
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn cli_run_uses_configured_reward() {
    let dir = TempDir::new().expect("temp dir");
    let config = write(&dir, "config.toml", "[attendance]\nreward = 7\n");
    let script = write(&dir, "scenario.txt", "streamer start-attendance\nv mark\n");

    let output = streamledger(dir.path())
        .args(["--json", "run", "--config"])
        .arg(&config)
        .arg("--script")
        .arg(&script)
        .output()
        .expect("run streamledger");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("\"v\":7"));
}

#[test]
fn cli_config_validate_rejects_bad_value() {
    let dir = TempDir::new().expect("temp dir");
    let config = write(&dir, "config.toml", "[prediction]\nstake = 0\n");

    streamledger(dir.path())
        .args(["config", "validate", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("stake"));
}

#[test]
fn cli_config_init_writes_template_once() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("config.toml");

    streamledger(dir.path())
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .success();
    let written = fs::read_to_string(&path).expect("config written");
    assert!(written.contains("[attendance]"));

    streamledger(dir.path())
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    streamledger(dir.path())
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .success();
}
