//! End-to-end rendering of the fixture templates through the library API.

use std::sync::Arc;

use anyhow::Result;
use krender::core::DeploySummary;
use krender::templating::{Renderer, RendererOptions, TemplateError};
use krender::test_utils::{TemplateTree, to_bindings};
use serde_json::json;

use crate::common::{TEST_SHA, fixture_template_dir, parse_documents};

fn fixture_renderer() -> Result<(Renderer, Arc<DeploySummary>)> {
    let summary = Arc::new(DeploySummary::new());
    let renderer = Renderer::new(
        RendererOptions::new(fixture_template_dir())
            .with_current_sha(TEST_SHA)
            .with_bindings(to_bindings(json!({"a": "1", "b": "2"}))?)
            .with_summary(summary.clone()),
    )?;
    Ok((renderer, summary))
}

fn render_fixture(renderer: &Renderer, filename: &str) -> Result<String> {
    let raw = std::fs::read_to_string(fixture_template_dir().join(filename))?;
    Ok(renderer.render_template(filename, &raw)?)
}

#[test]
fn test_partials_render_into_five_documents() -> Result<()> {
    let (renderer, summary) = fixture_renderer()?;

    let rendered = render_fixture(&renderer, "partials_test.yaml.tera")?;
    let documents = parse_documents(&rendered)?;

    assert_eq!(
        documents,
        vec![
            json!({"a": 1, "b": 2}),
            json!({"c": "c3", "d": "d4", "nested": {"foo": "bar"}}),
            json!({"e": "e5", "f": "f6"}),
            json!({"foo": "baz"}),
            json!({
                "value": 4,
                "step": {
                    "value": 3,
                    "step": {
                        "value": 2,
                        "step": {"value": 1, "result": 24}
                    }
                }
            }),
        ]
    );
    assert!(summary.is_empty());
    Ok(())
}

#[test]
fn test_local_partials_shadow_shared_ones() -> Result<()> {
    let (renderer, _) = fixture_renderer()?;

    let resolved = renderer.resolver().resolve("foo")?;
    assert_eq!(resolved.path, fixture_template_dir().join("partials").join("foo.yaml.tera"));

    let rendered = render_fixture(&renderer, "partials_test.yaml.tera")?;
    assert!(!rendered.contains("shadowed"));
    Ok(())
}

#[test]
fn test_embedded_partials_and_shared_fallback() -> Result<()> {
    let (renderer, _) = fixture_renderer()?;

    let rendered = render_fixture(&renderer, "service.yaml.tera")?;
    let documents = parse_documents(&rendered)?;

    assert_eq!(documents.len(), 1);
    assert_eq!(
        documents[0]["metadata"]["labels"],
        json!({"app": "web", "tier": "frontend", "revision": TEST_SHA})
    );
    assert_eq!(
        documents[0]["spec"]["ports"],
        json!([{"name": "http", "port": 80, "targetPort": 80}])
    );
    Ok(())
}

#[test]
fn test_plain_files_are_not_evaluated() -> Result<()> {
    let (renderer, _) = fixture_renderer()?;

    let raw = std::fs::read_to_string(fixture_template_dir().join("plain.yaml"))?;
    assert_eq!(render_fixture(&renderer, "plain.yaml")?, raw);
    Ok(())
}

#[test]
fn test_partial_errors_surface_as_render_errors() -> Result<()> {
    let tree = TemplateTree::new()?;
    tree.write_shared_partial("shared.yaml.tera", "inner: {{ partial(name=\"missing\") }}")?;
    let (renderer, summary) = tree.renderer(json!({}))?;

    let error = renderer
        .render_template("web.yaml.tera", "outer: {{ partial(name=\"shared\") }}")
        .unwrap_err();

    assert_eq!(error.to_string(), "Template 'web.yaml.tera' cannot be rendered");
    let TemplateError::PartialNotFound {
        name,
        attempted,
    } = error.cause()
    else {
        panic!("expected PartialNotFound, got {:?}", error.cause());
    };
    assert_eq!(name, "missing");
    assert_eq!(
        attempted,
        &vec![
            tree.template_dir().join("partials/missing.yaml.tera"),
            tree.template_dir().join("partials/missing.yml.tera"),
            tree.shared_partials_dir().join("missing.yaml.tera"),
            tree.shared_partials_dir().join("missing.yml.tera"),
        ]
    );
    assert_eq!(summary.paragraphs().len(), 1);
    Ok(())
}
