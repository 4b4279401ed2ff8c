use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("vidbrief")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("transcript"))
        .stdout(predicate::str::contains("brief"));
}

#[test]
fn version_flag_works() {
    Command::cargo_bin("vidbrief")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vidbrief"));
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("vidbrief")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn transcript_rejects_malformed_url() {
    Command::cargo_bin("vidbrief")
        .unwrap()
        .args(["--quiet", "transcript", "not-a-url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid video locator"));
}
