//! Tests for argument parsing and template discovery.

use clap::Parser;

use super::{Cli, list_templates, parse_depth};
use crate::core::KrenderError;
use crate::test_utils::TemplateTree;

#[test]
fn test_cli_parsing() {
    let cli = Cli::try_parse_from(["krender", "--help"]);
    assert!(cli.is_err()); // --help causes a special error

    let cli = Cli::try_parse_from([
        "krender",
        "--template-dir",
        "deploy",
        "--bindings",
        "a=1",
        "--bindings",
        "@values.yaml",
        "web.yaml.tera",
        "worker.yaml",
    ])
    .unwrap();
    assert_eq!(cli.template_dir.as_deref(), Some("deploy"));
    assert_eq!(cli.bindings, vec!["a=1", "@values.yaml"]);
    assert_eq!(cli.filenames, vec!["web.yaml.tera", "worker.yaml"]);
}

#[test]
fn test_log_level_flags() {
    let cli = Cli::try_parse_from(["krender", "--verbose"]).unwrap();
    assert_eq!(cli.log_level(), Some("debug"));

    let cli = Cli::try_parse_from(["krender", "-q"]).unwrap();
    assert_eq!(cli.log_level(), Some("error"));

    let cli = Cli::try_parse_from(["krender"]).unwrap();
    assert_eq!(cli.log_level(), None);

    assert!(Cli::try_parse_from(["krender", "-v", "-q"]).is_err());
}

#[test]
fn test_max_partial_depth_must_be_positive() {
    assert_eq!(parse_depth("8"), Ok(8));
    assert!(parse_depth("0").is_err());
    assert!(parse_depth("deep").is_err());
    assert!(Cli::try_parse_from(["krender", "--max-partial-depth", "0"]).is_err());
}

#[test]
fn test_list_templates_filters_and_sorts() {
    let tree = TemplateTree::new().unwrap();
    tree.write_template("web.yaml.tera", "a: 1").unwrap();
    tree.write_template("config.yml", "a: 1").unwrap();
    tree.write_template("ingress.yaml", "a: 1").unwrap();
    tree.write_template("job.yml.tera", "a: 1").unwrap();
    tree.write_template("README.md", "docs").unwrap();
    tree.write_template("notes.tera", "x").unwrap();
    tree.write_template("nested/deep.yaml", "a: 1").unwrap();

    let names = list_templates(&tree.template_dir()).unwrap();
    assert_eq!(names, vec!["config.yml", "ingress.yaml", "job.yml.tera", "web.yaml.tera"]);
}

#[tokio::test]
async fn test_missing_template_dir_is_reported() {
    let tree = TemplateTree::new().unwrap();
    let missing = tree.template_dir().join("does-not-exist");
    let config = tree.template_dir().join("krender.toml");
    std::fs::write(&config, "").unwrap();

    let cli = Cli::try_parse_from([
        "krender",
        "--config",
        config.to_str().unwrap(),
        "--template-dir",
        missing.to_str().unwrap(),
    ])
    .unwrap();

    let error = cli.execute().await.unwrap_err();
    assert!(matches!(
        error.downcast_ref::<KrenderError>(),
        Some(KrenderError::TemplateDirNotFound { .. })
    ));
}

#[tokio::test]
async fn test_failed_render_is_reported_after_all_files() {
    let tree = TemplateTree::new().unwrap();
    tree.write_template("a.yaml.tera", "a: {{ missing }}").unwrap();
    tree.write_template("b.yaml", "b: 2").unwrap();
    tree.write_template("c.yaml.tera", "c: {{ partial(name=\"nope\") }}").unwrap();
    let config = tree.template_dir().join("krender.toml");
    std::fs::write(&config, "").unwrap();

    let cli = Cli::try_parse_from([
        "krender",
        "-q",
        "--config",
        config.to_str().unwrap(),
        "--template-dir",
        tree.template_dir().to_str().unwrap(),
    ])
    .unwrap();

    let error = cli.execute().await.unwrap_err();
    let Some(KrenderError::RenderFailed {
        failed,
        total,
    }) = error.downcast_ref::<KrenderError>()
    else {
        panic!("expected RenderFailed, got {error}");
    };
    assert_eq!((*failed, *total), (2, 3));
}
