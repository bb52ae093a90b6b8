//! Configuration schema definitions.
//!
//! This module defines the resolved configuration consumed by the server.
//! All types are immutable value objects; they derive `Serialize` so the
//! resolved result can be printed, but they are built by the resolver rather
//! than deserialized.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::config::validation::{validate_config, ValidationError};

/// MIME types compressed by default.
pub const DEFAULT_COMPRESSIBLE_CONTENT_TYPES: &[&str] = &[
    "text/plain",
    "text/html",
    "text/xml",
    "text/css",
    "application/xml",
    "application/xhtml+xml",
    "application/rss+xml",
    "application/json",
    "application/jsonml+json",
    "application/javascript",
    "application/x-javascript",
];

/// Root configuration for the web server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    /// Server identity, reported in logs and headers.
    pub server_name: String,

    /// Host name or address to bind.
    pub hostname: String,

    /// Port to bind.
    pub port: i64,

    /// Access log settings; `None` disables the access log.
    pub access_log: Option<AccessLogConfig>,

    /// TLS settings; `None` serves plain HTTP.
    pub tls: Option<TlsConfig>,

    /// HTTP protocol limits.
    pub http: HttpConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: "WebServer".to_string(),
            hostname: "localhost".to_string(),
            port: 8888,
            access_log: None,
            tls: None,
            http: HttpConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a configuration with the given identity and default sections.
    pub fn new(server_name: impl Into<String>, hostname: impl Into<String>, port: i64) -> Self {
        Self {
            server_name: server_name.into(),
            hostname: hostname.into(),
            port,
            ..Self::default()
        }
    }

    /// Replace the TLS section.
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Replace the access log section.
    pub fn with_access_log(mut self, access_log: AccessLogConfig) -> Self {
        self.access_log = Some(access_log);
        self
    }

    /// Replace the HTTP limits.
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Address string suitable for binding (e.g., "localhost:8888").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }

    /// Returns true if the server should terminate TLS.
    pub fn tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Check cross-field invariants. See [`validate_config`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_config(self)
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsConfig {
    /// Path to the key store holding the server certificate and key.
    pub key_store_path: PathBuf,

    /// Key store password.
    #[serde(skip_serializing)]
    pub key_store_password: String,

    /// Optional trust store for client certificate verification.
    pub trust_store_path: Option<PathBuf>,

    /// Trust store password; required whenever a trust store is configured.
    #[serde(skip_serializing)]
    pub trust_store_password: Option<String>,
}

impl TlsConfig {
    /// Create a TLS configuration without a trust store.
    pub fn new(key_store_path: impl Into<PathBuf>, key_store_password: impl Into<String>) -> Self {
        Self {
            key_store_path: key_store_path.into(),
            key_store_password: key_store_password.into(),
            trust_store_path: None,
            trust_store_password: None,
        }
    }

    /// Attach a trust store.
    pub fn with_trust_store(
        mut self,
        trust_store_path: impl Into<PathBuf>,
        trust_store_password: Option<String>,
    ) -> Self {
        self.trust_store_path = Some(trust_store_path.into());
        self.trust_store_password = trust_store_password;
        self
    }
}

/// Access log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLogFormat {
    /// NCSA common log format.
    #[default]
    Common,
    /// Common format plus referer and user agent.
    Extended,
}

/// Error returned when an access log format name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown access log format `{0}` (expected: common, extended)")]
pub struct UnknownAccessLogFormat(pub String);

impl FromStr for AccessLogFormat {
    type Err = UnknownAccessLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "common" => Ok(AccessLogFormat::Common),
            "extended" => Ok(AccessLogFormat::Extended),
            _ => Err(UnknownAccessLogFormat(s.to_string())),
        }
    }
}

impl fmt::Display for AccessLogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLogFormat::Common => write!(f, "common"),
            AccessLogFormat::Extended => write!(f, "extended"),
        }
    }
}

/// Access log configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessLogConfig {
    /// Line format.
    pub format: AccessLogFormat,

    /// Queued events before new events are dropped.
    pub buffer_size: i64,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            format: AccessLogFormat::Common,
            buffer_size: 512,
        }
    }
}

/// HTTP protocol limits.
///
/// Fields are read-only so the precomputed `max_request_size_bytes` always
/// agrees with `max_request_size_mb`. Build one with [`HttpConfig::builder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpConfig {
    max_request_size_mb: i64,
    max_request_size_bytes: i64,
    max_initial_line_length: i64,
    max_header_size_bytes: i64,
    max_chunk_size_bytes: i64,
    aggregate_chunks: bool,
    min_compressible_size_bytes: i64,
    max_compressible_size_bytes: i64,
    compressible_content_types: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfigBuilder::default().build()
    }
}

impl HttpConfig {
    /// Start from the default limits.
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::default()
    }

    /// Maximum request body size in megabytes.
    pub fn max_request_size_mb(&self) -> i64 {
        self.max_request_size_mb
    }

    /// Maximum request body size in bytes, derived once from the MB value.
    pub fn max_request_size_bytes(&self) -> i64 {
        self.max_request_size_bytes
    }

    /// Maximum length of the request line.
    pub fn max_initial_line_length(&self) -> i64 {
        self.max_initial_line_length
    }

    /// Maximum size of all request headers.
    pub fn max_header_size_bytes(&self) -> i64 {
        self.max_header_size_bytes
    }

    /// Maximum size of a single body chunk.
    pub fn max_chunk_size_bytes(&self) -> i64 {
        self.max_chunk_size_bytes
    }

    /// Whether chunked bodies are aggregated before dispatch.
    pub fn aggregate_chunks(&self) -> bool {
        self.aggregate_chunks
    }

    /// Smallest response body worth compressing.
    pub fn min_compressible_size_bytes(&self) -> i64 {
        self.min_compressible_size_bytes
    }

    /// Largest response body that will be compressed.
    pub fn max_compressible_size_bytes(&self) -> i64 {
        self.max_compressible_size_bytes
    }

    /// MIME types eligible for compression, in configured order.
    pub fn compressible_content_types(&self) -> &[String] {
        &self.compressible_content_types
    }

    /// Returns true if a response of this type and length should be compressed.
    ///
    /// Media type parameters (`; charset=utf-8`) are ignored and the type
    /// comparison is case-insensitive.
    pub fn is_compressible(&self, content_type: &str, len: i64) -> bool {
        if len < self.min_compressible_size_bytes || len > self.max_compressible_size_bytes {
            return false;
        }
        let mime = content_type.split(';').next().unwrap_or_default().trim();
        self.compressible_content_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(mime))
    }
}

/// Builder for [`HttpConfig`]; starts from the default limits.
#[derive(Debug, Clone)]
pub struct HttpConfigBuilder {
    max_request_size_mb: i64,
    max_initial_line_length: i64,
    max_header_size_bytes: i64,
    max_chunk_size_bytes: i64,
    aggregate_chunks: bool,
    min_compressible_size_bytes: i64,
    max_compressible_size_bytes: i64,
    compressible_content_types: Vec<String>,
}

impl Default for HttpConfigBuilder {
    fn default() -> Self {
        Self {
            max_request_size_mb: 4,
            max_initial_line_length: 4096,
            max_header_size_bytes: 8192,
            max_chunk_size_bytes: 8192,
            aggregate_chunks: true,
            min_compressible_size_bytes: 1024,
            max_compressible_size_bytes: 1024 * 1024, // 1MB
            compressible_content_types: DEFAULT_COMPRESSIBLE_CONTENT_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl HttpConfigBuilder {
    /// Largest accepted request body, in megabytes.
    pub fn max_request_size_mb(mut self, value: i64) -> Self {
        self.max_request_size_mb = value;
        self
    }

    /// Longest accepted request line.
    pub fn max_initial_line_length(mut self, value: i64) -> Self {
        self.max_initial_line_length = value;
        self
    }

    /// Largest accepted header block, in bytes.
    pub fn max_header_size_bytes(mut self, value: i64) -> Self {
        self.max_header_size_bytes = value;
        self
    }

    /// Largest accepted body chunk, in bytes.
    pub fn max_chunk_size_bytes(mut self, value: i64) -> Self {
        self.max_chunk_size_bytes = value;
        self
    }

    /// Whether chunked bodies are aggregated into one message.
    pub fn aggregate_chunks(mut self, value: bool) -> Self {
        self.aggregate_chunks = value;
        self
    }

    /// Smallest response body eligible for compression.
    pub fn min_compressible_size_bytes(mut self, value: i64) -> Self {
        self.min_compressible_size_bytes = value;
        self
    }

    /// Largest response body eligible for compression.
    pub fn max_compressible_size_bytes(mut self, value: i64) -> Self {
        self.max_compressible_size_bytes = value;
        self
    }

    /// MIME types eligible for compression.
    pub fn compressible_content_types(mut self, value: Vec<String>) -> Self {
        self.compressible_content_types = value;
        self
    }

    /// Freeze the limits, computing the derived byte size.
    pub fn build(self) -> HttpConfig {
        HttpConfig {
            max_request_size_mb: self.max_request_size_mb,
            max_request_size_bytes: self.max_request_size_mb.saturating_mul(1024 * 1024),
            max_initial_line_length: self.max_initial_line_length,
            max_header_size_bytes: self.max_header_size_bytes,
            max_chunk_size_bytes: self.max_chunk_size_bytes,
            aggregate_chunks: self.aggregate_chunks,
            min_compressible_size_bytes: self.min_compressible_size_bytes,
            max_compressible_size_bytes: self.max_compressible_size_bytes,
            compressible_content_types: self.compressible_content_types,
        }
    }
}
