// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Integration tests for the `jacy` binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn jacy_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_jacy"))
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn jacy(args: &[&str], file: &Path) -> Output {
    Command::new(jacy_binary())
        .args(args)
        .arg(file)
        .env("NO_COLOR", "1")
        .env_remove("JACY_LOG")
        .output()
        .expect("failed to run jacy")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn clean_file_resolves() {
    let out = jacy(&[], &fixture("ok.jc"));
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("=== Resolve OK ==="));
    assert!(stderr(&out).is_empty(), "stderr: {}", stderr(&out));
}

#[test]
fn parse_error_is_reported() {
    let out = jacy(&[], &fixture("parse_error.jc"));
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("Expected ')', found 'val'"), "stderr: {}", err);
    assert!(err.contains("parse_error.jc:3:1"), "stderr: {}", err);
    assert!(err.contains("Parse FAILED: 1 error"), "stderr: {}", err);
}

#[test]
fn unresolved_name_is_reported() {
    let out = jacy(&[], &fixture("unresolved.jc"));
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("Cannot find `cout` in this scope"), "stderr: {}", err);
    assert!(err.contains("help: did you mean `count`?"), "stderr: {}", err);
    assert!(err.contains("Resolve FAILED: 1 error"), "stderr: {}", err);
}

#[test]
fn compile_depth_parser_skips_resolution() {
    let out = jacy(&["-compile-depth=parser"], &fixture("unresolved.jc"));
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("=== Parse OK ==="));
}

#[test]
fn print_names() {
    let out = jacy(&["-print=names"], &fixture("ok.jc"));
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    for name in ["Point", "Color", "sum", "origin", "total"] {
        assert!(text.contains(name), "missing {} in {}", name, text);
    }
}

#[test]
fn json_format() {
    let out = jacy(&["-format=json"], &fixture("unresolved.jc"));
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    assert!(text.contains("\"stage\": \"resolve\""), "stdout: {}", text);
    assert!(text.contains("Cannot find `cout` in this scope"));
    assert!(!stderr(&out).contains("FAILED"));
}

#[test]
fn lexer_error_from_scratch_file() {
    let mut file = tempfile::Builder::new().suffix(".jc").tempfile().unwrap();
    writeln!(file, "val x = 1 # not a comment").unwrap();
    let out = jacy(&[], file.path());
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("Unexpected character '#'"), "stderr: {}", err);
    assert!(err.contains("comments start with '//'"), "stderr: {}", err);
    assert!(err.contains("Lex FAILED: 1 error"), "stderr: {}", err);
}

#[test]
fn usage_errors_exit_with_two() {
    let out = jacy(&["-bogus=1"], &fixture("ok.jc"));
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("unknown option `-bogus=1`"));
}

#[test]
fn missing_file_fails() {
    let out = jacy(&[], Path::new("does/not/exist.jc"));
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("cannot read"));
}
