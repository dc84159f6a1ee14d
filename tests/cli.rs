//! CLI integration tests for the `gramdex` binary.
//!
//! Uses `assert_cmd` to spawn the binary as a subprocess, pipe the
//! interactive protocol through stdin, and assert on stdout/stderr/exit
//! code.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn gramdex_cmd() -> Command {
    Command::from(cargo_bin_cmd!("gramdex"))
}

/// Write the shared test corpus to a per-test temp file.
fn write_corpus(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("gramdex_cli_{name}.txt"));
    std::fs::write(&path, "the cat ran\t3\nthe cat sat\t5\nthe dog sat\t2\n").unwrap();
    path
}

// ---------------------------------------------------------------------------
// Basic CLI behavior
// ---------------------------------------------------------------------------

#[test]
fn help_flag() {
    gramdex_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("n-gram"));
}

#[test]
fn version_flag() {
    gramdex_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gramdex-cli"));
}

#[test]
fn missing_file_fails() {
    gramdex_cmd()
        .args(["/nonexistent/path/corpus.txt", "3"])
        .write_stdin("2\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read n-gram file"));
}

#[test]
fn k_below_two_fails() {
    let corpus = write_corpus("k_below_two");
    gramdex_cmd()
        .args([corpus.to_str().unwrap(), "3"])
        .write_stdin("1\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("top-k width"));
}

// ---------------------------------------------------------------------------
// Query loop
// ---------------------------------------------------------------------------

#[test]
fn frequency_count_query() {
    let corpus = write_corpus("frequency_count");
    gramdex_cmd()
        .args([corpus.to_str().unwrap(), "3"])
        .write_stdin("2\n1\nthe\ncat\ne\n0\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Occurs 8 times"));
}

#[test]
fn most_likely_next_query() {
    let corpus = write_corpus("most_likely_next");
    gramdex_cmd()
        .args([corpus.to_str().unwrap(), "3"])
        .write_stdin("2\n0\n2\nthe\ncat\ne\n0\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("0. sat"))
        .stdout(predicate::str::contains("1. ran"));
}

#[test]
fn absent_prefix_counts_zero() {
    let corpus = write_corpus("absent_prefix");
    gramdex_cmd()
        .args([corpus.to_str().unwrap(), "3"])
        .write_stdin("2\n1\nxyz\ne\n0\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Occurs 0 times"));
}

#[test]
fn queries_report_timing() {
    let corpus = write_corpus("timing");
    gramdex_cmd()
        .args([corpus.to_str().unwrap(), "3"])
        .write_stdin("2\n1\nthe\ne\n0\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Query took:"));
}

#[test]
fn zero_results_requested_exits() {
    let corpus = write_corpus("zero_results");
    gramdex_cmd()
        .args([corpus.to_str().unwrap(), "3"])
        .write_stdin("2\n0\n0\n")
        .assert()
        .success();
}

#[test]
fn eof_at_query_prompt_exits_cleanly() {
    let corpus = write_corpus("eof_query");
    gramdex_cmd()
        .args([corpus.to_str().unwrap(), "3"])
        .write_stdin("2\n")
        .assert()
        .success();
}

#[test]
fn eof_before_k_exits_cleanly() {
    let corpus = write_corpus("eof_k");
    gramdex_cmd()
        .args([corpus.to_str().unwrap(), "3"])
        .write_stdin("")
        .assert()
        .success();
}

#[test]
fn unknown_query_kind_reprompts() {
    let corpus = write_corpus("unknown_kind");
    gramdex_cmd()
        .args([corpus.to_str().unwrap(), "3"])
        .write_stdin("2\n5\n1\nthe\ne\n0\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown query kind 5"))
        .stdout(predicate::str::contains("Occurs 10 times"));
}

#[test]
fn build_reports_index_stats() {
    let corpus = write_corpus("stats");
    gramdex_cmd()
        .args([corpus.to_str().unwrap(), "3"])
        .write_stdin("2\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Indexed 5 words"));
}
