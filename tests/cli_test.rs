//! Tests for the `bionify` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_file_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("page.html");
    let output = temp_dir.path().join("out.html");
    fs::write(&input, "<p>hello world</p><pre>keep me</pre>").unwrap();

    cargo_bin_cmd!("bionify")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("<p><strong>hel</strong>lo <strong>wor</strong>ld</p>"));
    assert!(html.contains("<pre>keep me</pre>"));
}

#[test]
fn test_stdin_to_stdout_with_json_report() {
    let assert = cargo_bin_cmd!("bionify")
        .args(["-", "--json"])
        .write_stdin("<p>one two</p><p><b>three</b></p>")
        .assert()
        .success()
        .stdout(predicate::str::contains("<strong>on</strong>e"));

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert_eq!(report["status"], "success");
    assert_eq!(report["processed"], 2);
    assert_eq!(report["modified"], 1);
}

#[test]
fn test_extra_stylesheet_and_dark_flag() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("page.html");
    let css = temp_dir.path().join("night.css");
    fs::write(&input, "<p>dusk</p>").unwrap();
    fs::write(&css, "body { background: #000; } p { background: #050505; color: #ddd }").unwrap();

    cargo_bin_cmd!("bionify")
        .arg(&input)
        .arg("--css")
        .arg(&css)
        .arg("--prefers-dark")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"<span style="font-weight: bold; color: #D4D4D4">du</span>"#,
        ))
        .stderr(predicate::str::contains(
            "Processed 1 text nodes (1 modified, 1 words)",
        ));
}

#[test]
fn test_prefers_dark_from_env() {
    cargo_bin_cmd!("bionify")
        .arg("-")
        .env("BIONIFY_PREFERS_DARK", "true")
        .write_stdin("<p>noon</p>")
        .assert()
        .success()
        .stdout(predicate::str::contains("<strong>no</strong>on"));
}

#[test]
fn test_missing_input_fails() {
    let temp_dir = TempDir::new().unwrap();

    cargo_bin_cmd!("bionify")
        .arg(temp_dir.path().join("absent.html"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: I/O error: "))
        .stderr(predicate::str::contains("absent.html"));
}

#[test]
fn test_missing_stylesheet_fails_before_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("page.html");
    let output = temp_dir.path().join("out.html");
    fs::write(&input, "<p>hello</p>").unwrap();

    cargo_bin_cmd!("bionify")
        .arg(&input)
        .arg("--css")
        .arg(temp_dir.path().join("missing.css"))
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error: "))
        .stderr(predicate::str::contains("missing.css"));

    assert!(!output.exists());
}

#[test]
fn test_unwritable_output_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("page.html");
    fs::write(&input, "<p>hello</p>").unwrap();

    cargo_bin_cmd!("bionify")
        .arg(&input)
        .arg("-o")
        .arg(temp_dir.path().join("no-such-dir").join("out.html"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: I/O error: "));
}
