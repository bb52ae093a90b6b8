//! Web server configuration resolution and validation.

pub mod config;
pub mod observability;

pub use config::schema::ServerConfig;
pub use observability::{DiagnosticSink, TracingSink};
