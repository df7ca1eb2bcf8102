//! Common test utilities for krender integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use assert_cmd::Command;
use serde::Deserialize;
use serde_json::Value;

/// Commit SHA used by the fixture tests.
pub const TEST_SHA: &str = "1234567890abcdef1234567890abcdef12345678";

/// Root of the checked-in fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Template directory of the fixture scenario.
pub fn fixture_template_dir() -> PathBuf {
    fixtures_dir().join("for_unit_tests")
}

/// Parse a YAML stream into JSON values, one per document.
pub fn parse_documents(text: &str) -> Result<Vec<Value>> {
    serde_yaml::Deserializer::from_str(text)
        .map(|document| Value::deserialize(document).context("Invalid YAML document"))
        .collect()
}

/// A `krender` command isolated from the caller's environment.
pub fn krender_cmd() -> Command {
    let mut cmd = Command::cargo_bin("krender").expect("krender binary is built for tests");
    cmd.env_remove("KRENDER_TEMPLATE_DIR").env_remove("REVISION").env_remove("RUST_LOG");
    cmd
}
