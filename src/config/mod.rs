//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + environment overrides
//!     → loader.rs (parse & overlay)
//!     → source.rs (ConfigSource over the raw table)
//!     → resolver.rs (sections + accessors.rs defaults)
//!     → ServerConfig (resolved, immutable)
//!     → validation.rs (semantic checks, fail fast)
//!     → shared via Arc to the listener, TLS layer and access log
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved
//! - Every field has a default; a broken optional section disables the feature
//! - Resolution never fails; only validation rejects a configuration

pub mod accessors;
pub mod loader;
pub mod resolver;
pub mod schema;
pub mod source;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use resolver::resolve_server_config;
pub use schema::{AccessLogConfig, AccessLogFormat, HttpConfig, ServerConfig, TlsConfig};
pub use source::{ConfigSource, SourceError, TomlSource};
pub use validation::{validate_config, ValidationError};
