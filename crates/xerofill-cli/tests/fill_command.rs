use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_xerofill_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("xerofill")
}

/// A complete configuration so commands get past config loading.
fn with_config(cmd: &mut Command) -> &mut Command {
    cmd.env("XERO_EMAIL", "me@example.com")
        .env("XERO_PASSWORD", "s3cret")
        .env("DEFAULT_PROJECT", "Internal")
        .env("DEFAULT_TASK", "Development")
}

#[test]
fn test_fill_command_help() {
    let mut cmd = Command::new(get_xerofill_bin());
    cmd.arg("fill").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Fill time entries"))
        .stdout(predicate::str::contains("--date"))
        .stdout(predicate::str::contains("--from"))
        .stdout(predicate::str::contains("--to"))
        .stdout(predicate::str::contains("--hours"))
        .stdout(predicate::str::contains("--chrome-path"))
        .stdout(predicate::str::contains("--profile-dir"))
        .stdout(predicate::str::contains("--retries"));
}

#[test]
fn test_fill_command_rejects_date_and_range_together() {
    let mut cmd = Command::new(get_xerofill_bin());
    cmd.arg("fill")
        .arg("--date")
        .arg("2024-01-01")
        .arg("--from")
        .arg("2024-01-01")
        .arg("--to")
        .arg("2024-01-05");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_fill_command_requires_both_range_ends() {
    let mut cmd = Command::new(get_xerofill_bin());
    cmd.arg("fill").arg("--from").arg("2024-01-01");

    cmd.assert().failure();
}

#[test]
fn test_fill_command_rejects_invalid_date() {
    let mut cmd = Command::new(get_xerofill_bin());
    cmd.arg("fill").arg("--date").arg("01/05/2024");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn test_fill_command_rejects_reversed_range() {
    let mut cmd = Command::new(get_xerofill_bin());
    with_config(&mut cmd)
        .arg("fill")
        .arg("--from")
        .arg("2024-01-05")
        .arg("--to")
        .arg("2024-01-01");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--from must not be after --to"));
}

#[test]
fn test_fill_command_rejects_single_retry_budget() {
    let mut cmd = Command::new(get_xerofill_bin());
    with_config(&mut cmd)
        .arg("fill")
        .arg("--date")
        .arg("2024-01-03")
        .arg("--retries")
        .arg("1");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("at least 2 attempts"));
}

#[test]
fn test_fill_command_requires_configuration() {
    let mut cmd = Command::new(get_xerofill_bin());
    cmd.env_remove("XERO_EMAIL")
        .env_remove("XERO_PASSWORD")
        .env_remove("XERO_CREDENTIALS")
        .env_remove("DEFAULT_PROJECT")
        .env_remove("DEFAULT_TASK")
        .arg("fill")
        .arg("--date")
        .arg("2024-01-03");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing configuration key"));
}

#[test]
fn test_fill_command_reports_missing_chrome() {
    let mut cmd = Command::new(get_xerofill_bin());
    with_config(&mut cmd)
        .arg("fill")
        .arg("--date")
        .arg("2024-01-03")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Chrome not found"));
}
