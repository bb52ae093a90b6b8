//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Resolver degrades a broken section:
//!     → diagnostics.rs (DiagnosticSink, injected by the caller)
//!     → TracingSink emits a structured warn! event
//!
//! Binary startup:
//!     → logging.rs installs the tracing subscriber
//! ```
//!
//! # Design Decisions
//! - Resolution never logs through a global; diagnostics go to an injected sink
//! - Structured fields (component, error) for machine parsing
//! - RUST_LOG overrides the configured level

pub mod diagnostics;
pub mod logging;

pub use diagnostics::{Diagnostic, DiagnosticSink, RecordingSink, TracingSink};
