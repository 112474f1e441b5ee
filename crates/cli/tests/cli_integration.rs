//! CLI integration tests for the `jlcheck` binary.
//!
//! Uses `assert_cmd` to spawn the binary and verify exit codes, stdout
//! content, and stderr content. Source files are written to temp dirs.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper: create a Command for the `jlcheck` binary with a clean environment.
fn jlcheck() -> Command {
    let mut cmd = cargo_bin_cmd!("jlcheck");
    cmd.env_remove("JLCHECK_CONFIG").env_remove("JLCHECK_LOG");
    cmd
}

/// Helper: write `content` to `name` inside a fresh temp dir.
fn source_file(content: &str, name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write source file");
    (dir, path)
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    jlcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Syntax validator"));
}

#[test]
fn version_exits_0() {
    jlcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("jlcheck"));
}

// ──────────────────────────────────────────────
// 2. Interactive loop
// ──────────────────────────────────────────────

#[test]
fn repl_validates_single_line_fragment() {
    jlcheck()
        .arg("repl")
        .write_stdin("x = 1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(">> Valid construct"));
}

#[test]
fn repl_is_the_default_command() {
    jlcheck()
        .write_stdin("x = 1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid construct"));
}

#[test]
fn repl_accumulates_block_until_blank_line() {
    jlcheck()
        .write_stdin("if x > 1 :\nprint(x)\nend\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(">> .. .. .. Valid construct"));
}

#[test]
fn repl_reports_missing_end() {
    jlcheck()
        .write_stdin("if x > 1 : print(x)\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Syntax error: unexpected end of input\nInvalid construct",
        ));
}

#[test]
fn repl_reports_illegal_character_before_verdict() {
    jlcheck()
        .write_stdin("x =@ 1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Illegal character '@'\nValid construct",
        ));
}

#[test]
fn repl_quiet_reports_only_rejected_fragments() {
    jlcheck()
        .args(["--quiet", "repl"])
        .write_stdin("x = 1\ny =\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid construct").not())
        .stdout(predicate::str::contains(
            "Syntax error: unexpected end of input\nInvalid construct",
        ));
}

#[test]
fn repl_uses_configured_prompts() {
    let (_dir, config) = source_file(
        "[repl]\nprompt = \"jl> \"\ncontinuation_prompt = \"... \"\n",
        "jlcheck.toml",
    );
    jlcheck()
        .arg("--config")
        .arg(&config)
        .write_stdin("while x :\nx = x - 1\nend\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("jl> ... ... ... Valid construct"));
}

#[test]
fn config_from_environment_variable() {
    let (_dir, config) = source_file("[repl]\nprompt = \"env> \"\n", "jlcheck.toml");
    jlcheck()
        .env("JLCHECK_CONFIG", &config)
        .write_stdin("x = 1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("env> Valid construct"));
}

#[test]
fn malformed_config_exits_1() {
    let (_dir, config) = source_file("[repl\n", "jlcheck.toml");
    jlcheck()
        .arg("--config")
        .arg(&config)
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid configuration"));
}

// ──────────────────────────────────────────────
// 3. check subcommand
// ──────────────────────────────────────────────

#[test]
fn check_all_valid_exits_0() {
    let (_dir, path) = source_file(
        "x = 1\n\nstruct P : x = 1 y = 2 end\nfor i in 1 :\n  print(i)\nend\n\n",
        "ok.jl",
    );
    jlcheck()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(":1: Valid construct"))
        .stdout(predicate::str::contains(":3: Valid construct"))
        .stdout(predicate::str::contains(":4: Valid construct"))
        .stdout(predicate::str::contains("Invalid").not());
}

#[test]
fn check_with_invalid_fragment_exits_1() {
    let (_dir, path) = source_file("x = 1\nx = = 2\n", "bad.jl");
    jlcheck()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains(":2: Syntax error : '='"))
        .stdout(predicate::str::contains(":2: Invalid construct"));
}

#[test]
fn check_quiet_prints_only_failures() {
    let (_dir, path) = source_file("x = 1\ny =\n", "mixed.jl");
    jlcheck()
        .args(["--quiet", "check"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains(":1:").not())
        .stdout(predicate::str::contains(":2: Invalid construct"));
}

#[test]
fn check_json_emits_one_object_per_fragment() {
    let (_dir, path) = source_file("x = 1\nif a :\nb\n", "frag.jl");
    let output = jlcheck()
        .args(["--output", "json", "check"])
        .arg(&path)
        .output()
        .expect("run jlcheck");
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    let objects: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("each line is JSON"))
        .collect();
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0]["valid"], true);
    assert_eq!(objects[0]["line"], 1);
    assert_eq!(objects[0]["statement"]["category"], "assignment");
    assert_eq!(objects[1]["valid"], false);
    assert_eq!(objects[1]["line"], 2);
    assert_eq!(objects[1]["diagnostics"][0]["kind"], "unexpected_eof");
}

#[test]
fn check_missing_file_exits_1() {
    jlcheck()
        .args(["check", "/nonexistent/file.jl"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading file"));
}

#[test]
fn check_deeply_nested_file_gets_a_verdict() {
    let depth = 50_000;
    let source = "while x : ".repeat(depth) + "y" + &" end".repeat(depth) + "\n";
    let (_dir, path) = source_file(&source, "deep.jl");
    jlcheck()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(":1: Valid construct"));
}

// ──────────────────────────────────────────────
// 4. tokens and group subcommands
// ──────────────────────────────────────────────

#[test]
fn tokens_lists_kinds_and_defects() {
    let (_dir, path) = source_file("if x >= 1.5 :\n  y = 'a' @\nend\n", "t.jl");
    jlcheck()
        .arg("tokens")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1\tIF\tif"))
        .stdout(predicate::str::contains("1\tLRGEQ\t>="))
        .stdout(predicate::str::contains("1\tFLOAT\t1.5"))
        .stdout(predicate::str::contains("2\tSTRING\t'a'"))
        .stdout(predicate::str::contains("3\tEND\tend"))
        .stdout(predicate::str::contains("Illegal character '@'"));
}

#[test]
fn group_shows_precedence() {
    jlcheck()
        .args(["group", "1 + 2 * 3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(1 + (2 * 3))"));
}

#[test]
fn group_rejects_non_expression() {
    jlcheck()
        .args(["group", "x = 1"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Syntax error : '='"));
}
