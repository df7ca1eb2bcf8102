//! Tests for the `krender` binary.

use predicates::prelude::*;
use tempfile::TempDir;

use crate::common::{TEST_SHA, fixture_template_dir, krender_cmd, parse_documents};

#[test]
fn test_renders_named_template_to_stdout() {
    let workdir = TempDir::new().unwrap();
    let output = krender_cmd()
        .current_dir(workdir.path())
        .arg("--template-dir")
        .arg(fixture_template_dir())
        .args(["--current-sha", TEST_SHA, "--bindings", "a=1,b=2", "partials_test.yaml.tera"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let documents = parse_documents(&stdout).unwrap();
    assert_eq!(documents.len(), 5);
    assert_eq!(documents[3], serde_json::json!({"foo": "baz"}));
}

#[test]
fn test_renders_every_manifest_without_filenames() {
    let workdir = TempDir::new().unwrap();
    let output = krender_cmd()
        .current_dir(workdir.path())
        .env("KRENDER_TEMPLATE_DIR", fixture_template_dir())
        .env("REVISION", TEST_SHA)
        .args(["--bindings", r#"{"a": "1", "b": "2"}"#])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let documents = parse_documents(&stdout).unwrap();

    // partials_test.yaml.tera (5), plain.yaml (1), service.yaml.tera (1)
    assert_eq!(documents.len(), 7);
    assert_eq!(documents[5]["metadata"]["name"], "plain");
    assert_eq!(documents[6]["metadata"]["labels"]["revision"], TEST_SHA);
}

#[test]
fn test_config_file_supplies_defaults() {
    let workdir = TempDir::new().unwrap();
    let templates = workdir.path().join("templates");
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(templates.join("app.yaml.tera"), "name: {{ app }}\nenv: {{ env }}\n").unwrap();
    std::fs::write(
        workdir.path().join("krender.toml"),
        "template_dir = \"templates\"\n\n[bindings]\napp = \"web\"\nenv = \"staging\"\n",
    )
    .unwrap();

    krender_cmd()
        .current_dir(workdir.path())
        .args(["--bindings", "env=production"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: web"))
        .stdout(predicate::str::contains("env: production"));
}

#[test]
fn test_failures_are_summarized_and_exit_nonzero() {
    let workdir = TempDir::new().unwrap();
    std::fs::write(workdir.path().join("good.yaml"), "a: 1\n").unwrap();
    std::fs::write(workdir.path().join("bad.yaml.tera"), "a: {{ partial(name=\"nope\") }}\n")
        .unwrap();

    krender_cmd()
        .current_dir(workdir.path())
        .env("NO_COLOR", "1")
        .arg("--template-dir")
        .arg(workdir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("a: 1"))
        .stderr(predicate::str::contains("Error from renderer:"))
        .stderr(predicate::str::contains("Partial 'nope' not found"))
        .stderr(predicate::str::contains("1 of 2 template(s) failed to render"));
}

#[test]
fn test_invalid_rendered_yaml_fails() {
    let workdir = TempDir::new().unwrap();
    std::fs::write(workdir.path().join("broken.yaml.tera"), "a: [{{ value }}\n").unwrap();

    krender_cmd()
        .current_dir(workdir.path())
        .arg("--template-dir")
        .arg(workdir.path())
        .args(["--bindings", "value=1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not valid YAML"));
}

#[test]
fn test_missing_template_dir() {
    let workdir = TempDir::new().unwrap();

    krender_cmd()
        .current_dir(workdir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No template directory specified"));
}

#[test]
fn test_invalid_bindings() {
    let workdir = TempDir::new().unwrap();

    krender_cmd()
        .current_dir(workdir.path())
        .arg("--template-dir")
        .arg(workdir.path())
        .args(["--bindings", "novalue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid bindings"));
}
