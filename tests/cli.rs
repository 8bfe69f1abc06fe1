use assert_cmd::Command;
use predicates::prelude::*;

fn summarizer() -> Command {
    Command::cargo_bin("summarizer").unwrap()
}

#[test]
fn help_lists_subcommands() {
    summarizer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("summarize"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("formats"));
}

#[test]
fn formats_lists_accepted_containers() {
    summarizer()
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("mp4, avi, mov, mkv"))
        .stdout(predicate::str::contains("bullet_points"));
}

#[test]
fn unsupported_file_fails_before_configuration() {
    summarizer()
        .args(["summarize", "notes.txt", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported media format"));
}

#[test]
fn invalid_locator_is_rejected() {
    summarizer()
        .args(["summarize", "https://example.com/short"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid video locator"));
}

#[test]
fn unknown_output_format_is_a_usage_error() {
    summarizer()
        .args(["show", "abc", "--output-format", "srt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
