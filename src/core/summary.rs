//! Deployment summary sink.
//!
//! The renderer reports failures as human-readable paragraphs to a summary
//! collaborator, which the surrounding deployment tool prints once the
//! operation finishes. [`DeploySummary`] is the in-process implementation used
//! by the CLI and the tests.

use std::sync::Mutex;

/// Receives human-readable paragraphs describing what happened.
pub trait SummarySink: Send + Sync {
    fn add_paragraph(&self, paragraph: &str);
}

/// Collects summary paragraphs in memory.
#[derive(Debug, Default)]
pub struct DeploySummary {
    paragraphs: Mutex<Vec<String>>,
}

impl DeploySummary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the paragraphs recorded so far.
    pub fn paragraphs(&self) -> Vec<String> {
        match self.paragraphs.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs().is_empty()
    }

    /// All paragraphs separated by blank lines.
    pub fn render(&self) -> String {
        self.paragraphs().join("\n\n")
    }
}

impl SummarySink for DeploySummary {
    fn add_paragraph(&self, paragraph: &str) {
        tracing::warn!("{}", paragraph);
        match self.paragraphs.lock() {
            Ok(mut guard) => guard.push(paragraph.to_string()),
            Err(poisoned) => poisoned.into_inner().push(paragraph.to_string()),
        }
    }
}
