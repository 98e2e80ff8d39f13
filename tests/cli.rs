use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn scraper_bin() -> Command {
    Command::cargo_bin("ctis-scraper").unwrap()
}

#[test]
fn help_lists_both_commands() {
    scraper_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scrape"))
        .stdout(predicate::str::contains("update-coordinates"));
}

#[test]
fn version_prints_package_version() {
    scraper_bin()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn scrape_help_shows_fresh_flag() {
    scraper_bin()
        .args(["scrape", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fresh"));
}

#[test]
fn update_coordinates_help_shows_limit() {
    scraper_bin()
        .args(["update-coordinates", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--limit"));
}

#[test]
fn unknown_subcommand_fails() {
    scraper_bin()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn scrape_rejects_unknown_flag() {
    scraper_bin()
        .args(["scrape", "--bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn rejects_invalid_environment() {
    // point --config at a missing file so only built-in defaults apply
    scraper_bin()
        .args(["--config", "/nonexistent/ctis-config.toml", "--env", "staging", "scrape"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid environment 'staging'"));
}
