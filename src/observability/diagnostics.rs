//! Diagnostics for degraded configuration sections.
//!
//! The resolver reports a section that is present but unusable to a
//! [`DiagnosticSink`] and carries on with defaults. The sink is passed in by
//! the caller, which keeps resolution free of global state.

use std::sync::{Mutex, PoisonError};

use crate::config::source::SourceError;

/// Receives warnings about configuration sections that fell back to defaults.
pub trait DiagnosticSink {
    /// A section for `component` was present but could not be read.
    fn degraded(&self, component: &str, error: &SourceError);
}

/// Emits diagnostics as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn degraded(&self, component: &str, error: &SourceError) {
        tracing::warn!(
            component,
            path = error.path(),
            error = %error,
            "Invalid {} configuration, falling back to defaults",
            component
        );
    }
}

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub component: String,
    pub error: SourceError,
}

/// Collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<Diagnostic> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl DiagnosticSink for RecordingSink {
    fn degraded(&self, component: &str, error: &SourceError) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Diagnostic {
                component: component.to_string(),
                error: error.clone(),
            });
    }
}
