#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but replacement requires nightly

use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn treesub_cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("treesub").unwrap()
}

/// Creates `rules.txt` and a `site/` tree with one matching and one
/// non-matching file.
fn setup(rules: &str) -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path().join("rules.txt");
    fs::write(&data, rules).unwrap();

    let site = temp_dir.path().join("site");
    fs::create_dir_all(site.join("sub")).unwrap();
    fs::write(site.join("sub/page.xhtml"), "foo foo baz\r\n").unwrap();
    fs::write(site.join("note.txt"), "foo\n").unwrap();

    (temp_dir, data, site)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ============================================================================
// Argument handling
// ============================================================================

#[test]
fn test_no_args_prints_usage_and_succeeds() {
    treesub_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid program arguments"))
        .stdout(predicate::str::contains("arg3 - file extension"));
}

#[test]
fn test_too_many_args_prints_usage() {
    treesub_cmd()
        .args(["a", "b", "c", "d"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid program arguments"));
}

#[test]
fn test_help_flag() {
    treesub_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("===>"))
        .stdout(predicate::str::contains("symlinked files and directories are skipped"));
}

// ============================================================================
// Rewriting
// ============================================================================

#[test]
fn test_rewrites_matching_files_only() {
    let (_dir, data, site) = setup("foo===>bar\n");

    treesub_cmd()
        .arg(&data)
        .arg(&site)
        .arg("xhtml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loading rules from"))
        .stdout(predicate::str::contains("Processing file"));

    assert_eq!(read(&site.join("sub/page.xhtml")), "bar bar baz\n");
    assert_eq!(read(&site.join("note.txt")), "foo\n");
    assert!(!site.join("sub/page.xhtml_tmp").exists());
}

#[test]
fn test_dry_run_with_json_report() {
    let (_dir, data, site) = setup("foo===>bar\n");

    let output = treesub_cmd()
        .arg(&data)
        .arg(&site)
        .arg("xhtml")
        .args(["--dry-run", "--quiet", "--report", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["files_matched"], 1);
    assert_eq!(report["substitutions"], 2);
    assert_eq!(report["files_rewritten"], 0);
    assert_eq!(read(&site.join("sub/page.xhtml")), "foo foo baz\r\n");
}

#[test]
fn test_literal_mode() {
    let (_dir, data, site) = setup("o.o===>X\n");
    fs::write(site.join("sub/page.xhtml"), "o.o oxo\n").unwrap();

    treesub_cmd()
        .arg(&data)
        .arg(&site)
        .arg("xhtml")
        .arg("--literal")
        .assert()
        .success();

    assert_eq!(read(&site.join("sub/page.xhtml")), "X oxo\n");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_malformed_rule_reports_and_exits_zero() {
    let (_dir, data, site) = setup("foo===>bar\nno separator\n");

    treesub_cmd()
        .arg(&data)
        .arg(&site)
        .arg("xhtml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Malformed rule"));

    assert_eq!(read(&site.join("sub/page.xhtml")), "foo foo baz\r\n");
}

#[test]
fn test_strict_turns_failure_into_exit_code() {
    let (_dir, data, site) = setup("no separator\n");

    treesub_cmd()
        .arg(&data)
        .arg(&site)
        .arg("xhtml")
        .arg("--strict")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Malformed rule"));
}

#[test]
fn test_missing_data_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();

    treesub_cmd()
        .arg(temp_dir.path().join("absent.txt"))
        .arg(temp_dir.path())
        .arg("xhtml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Error:"));
}

#[test]
fn test_missing_root_is_silent() {
    let (_dir, data, site) = setup("foo===>bar\n");

    treesub_cmd()
        .arg(&data)
        .arg(site.join("nowhere"))
        .arg("xhtml")
        .arg("--strict")
        .assert()
        .success()
        .stdout(predicate::str::contains("Error").not())
        .stdout(predicate::str::contains("Processing").not());
}
