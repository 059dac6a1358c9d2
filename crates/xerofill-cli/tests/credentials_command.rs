use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use xerofill_core::credentials;

#[allow(deprecated)]
fn get_xerofill_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("xerofill")
}

#[test]
fn test_encode_credentials_help() {
    let mut cmd = Command::new(get_xerofill_bin());
    cmd.arg("encode-credentials").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("XERO_CREDENTIALS"))
        .stdout(predicate::str::contains("--email"))
        .stdout(predicate::str::contains("--password"));
}

#[test]
fn test_encode_credentials_round_trips_through_the_binary() {
    let mut cmd = Command::new(get_xerofill_bin());
    cmd.arg("encode-credentials")
        .arg("--email")
        .arg("me@example.com")
        .arg("--password")
        .arg("s3cret with spaces!");

    let output = cmd.assert().success().get_output().stdout.clone();
    let blob = String::from_utf8(output).unwrap();

    let decoded = credentials::decode(blob.trim()).unwrap();
    assert_eq!(decoded.email, "me@example.com");
    assert_eq!(decoded.password, "s3cret with spaces!");
}
