//! Structured error types and per-binary failure records
//!
//! Using thiserror for automatic Display implementation. Fatal conditions
//! are real `Error` types; [`FailureReason`] is the diagnostic vocabulary
//! for binaries that stay unresolved without aborting the run.

use std::collections::HashMap;
use thiserror::Error;

/// Fatal catalog conditions. Anything here ends the run.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("no usable debug symbol bundles found under: {searched}")]
    NoBundles { searched: String },
}

/// Why a binary's addresses were left unresolved.
///
/// Recorded at most once per binary; the report body keeps its original
/// text for every line owned by a failed binary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("no build identifier in the binary image list")]
    MissingBuildId,

    #[error("build identifier does not match the debug symbols on disk")]
    BuildIdMismatch,

    #[error("no symbols found")]
    NoSymbolsFound,

    #[error("symbol resolver invocation failed: {0}")]
    ResolverFailed(String),

    #[error("symbol resolver returned insufficient output")]
    InsufficientOutput,
}

/// First-cause-wins failure log, keyed by binary name.
///
/// Insertion order is preserved so diagnostics print deterministically.
#[derive(Debug, Default)]
pub struct Failures {
    order: Vec<String>,
    reasons: HashMap<String, FailureReason>,
}

impl Failures {
    /// Record a failure unless the binary already has one.
    pub fn record(&mut self, name: &str, reason: FailureReason) {
        if !self.reasons.contains_key(name) {
            self.order.push(name.to_string());
            self.reasons.insert(name.to_string(), reason);
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.reasons.contains_key(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FailureReason)> {
        self.order.iter().map(move |name| (name.as_str(), &self.reasons[name.as_str()]))
    }
}
