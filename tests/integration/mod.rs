//! Integration test suite for krender
//!
//! These tests render the checked-in fixtures under `tests/fixtures` through
//! the library API and through the `krender` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **render**: End-to-end rendering of the fixture templates
//! - **cli**: The `krender` binary: arguments, config, output and exit status

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod render;
