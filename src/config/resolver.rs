//! Section resolution: configuration source → [`ServerConfig`].
//!
//! # Responsibilities
//! - Read every field through a total accessor with its documented default
//! - Treat an absent optional section as "not configured"
//! - Degrade a present-but-broken section to its fallback and report it
//!
//! # Design Decisions
//! - Resolution never fails; rejection is the validator's job
//! - A broken optional section disables that feature instead of aborting startup
//! - Diagnostics go to the injected sink, one per degraded section

use crate::config::accessors::{
    boolean_or, integer_or, optional_path, optional_string, string_list_or, string_or,
};
use crate::config::schema::{
    AccessLogConfig, AccessLogFormat, HttpConfig, ServerConfig, TlsConfig,
};
use crate::config::source::{ConfigSource, SourceError};
use crate::observability::DiagnosticSink;

pub const TLS_SECTION: &str = "tls";
pub const ACCESS_LOG_SECTION: &str = "access-log";
pub const HTTP_SECTION: &str = "http";

/// Resolve a complete configuration from `source`.
///
/// The result is not validated; call [`ServerConfig::validate`] before use.
pub fn resolve_server_config<S: ConfigSource>(
    source: &S,
    sink: &dyn DiagnosticSink,
) -> ServerConfig {
    let defaults = ServerConfig::default();

    let config = ServerConfig {
        server_name: string_or(source, "server-name", &defaults.server_name),
        hostname: string_or(source, "hostname", &defaults.hostname),
        port: integer_or(source, "port", defaults.port),
        access_log: resolve_access_log(source, sink),
        tls: resolve_tls(source, sink),
        http: resolve_http(source, sink),
    };

    tracing::debug!(
        server_name = %config.server_name,
        bind_address = %config.bind_address(),
        tls = config.tls_enabled(),
        access_log = config.access_log.is_some(),
        "Configuration resolved"
    );
    config
}

/// Resolve the `tls` section. `None` when absent or broken.
pub fn resolve_tls<S: ConfigSource>(source: &S, sink: &dyn DiagnosticSink) -> Option<TlsConfig> {
    optional_section(source, TLS_SECTION, "TLS", sink, read_tls)
}

/// Resolve the `access-log` section. `None` when absent or broken.
pub fn resolve_access_log<S: ConfigSource>(
    source: &S,
    sink: &dyn DiagnosticSink,
) -> Option<AccessLogConfig> {
    optional_section(source, ACCESS_LOG_SECTION, "access log", sink, read_access_log)
}

/// Resolve the `http` section. Defaults when absent or broken.
pub fn resolve_http<S: ConfigSource>(source: &S, sink: &dyn DiagnosticSink) -> HttpConfig {
    optional_section(source, HTTP_SECTION, "HTTP", sink, |section| {
        Ok(read_http(section))
    })
    .unwrap_or_default()
}

/// Locate `name` and read it, reporting a broken section to `sink`.
fn optional_section<S, T>(
    source: &S,
    name: &str,
    component: &str,
    sink: &dyn DiagnosticSink,
    read: impl FnOnce(&S) -> Result<T, SourceError>,
) -> Option<T>
where
    S: ConfigSource,
{
    let section = match source.get_section(name) {
        Ok(section) => section,
        Err(e) if e.is_missing() => {
            tracing::debug!(section = name, "Section not configured");
            return None;
        }
        Err(e) => {
            sink.degraded(component, &e);
            return None;
        }
    };

    match read(&section) {
        Ok(value) => Some(value),
        Err(e) => {
            sink.degraded(component, &e);
            None
        }
    }
}

fn read_tls<S: ConfigSource>(section: &S) -> Result<TlsConfig, SourceError> {
    // The key store is what makes the section meaningful; it is read strictly.
    let key_store_path = section.get_string("key-store-file")?;

    Ok(TlsConfig {
        key_store_path: key_store_path.into(),
        key_store_password: string_or(section, "key-store-password", ""),
        trust_store_path: optional_path(section, "trust-store-file"),
        trust_store_password: optional_string(section, "trust-store-password"),
    })
}

fn read_access_log<S: ConfigSource>(section: &S) -> Result<AccessLogConfig, SourceError> {
    let defaults = AccessLogConfig::default();

    let format = match optional_string(section, "format") {
        Some(name) => name.parse::<AccessLogFormat>().map_err(|e| SourceError::Invalid {
            path: section.qualify("format"),
            reason: e.to_string(),
        })?,
        None => defaults.format,
    };

    Ok(AccessLogConfig {
        format,
        buffer_size: integer_or(section, "buffer-size", defaults.buffer_size),
    })
}

fn read_http<S: ConfigSource>(section: &S) -> HttpConfig {
    let defaults = HttpConfig::default();

    HttpConfig::builder()
        .max_request_size_mb(integer_or(
            section,
            "max-request-size-mb",
            defaults.max_request_size_mb(),
        ))
        .max_initial_line_length(integer_or(
            section,
            "max-initial-line-length",
            defaults.max_initial_line_length(),
        ))
        .max_header_size_bytes(integer_or(
            section,
            "max-header-size-bytes",
            defaults.max_header_size_bytes(),
        ))
        .max_chunk_size_bytes(integer_or(
            section,
            "max-chunk-size-bytes",
            defaults.max_chunk_size_bytes(),
        ))
        .aggregate_chunks(boolean_or(
            section,
            "aggregate-chunks",
            defaults.aggregate_chunks(),
        ))
        .min_compressible_size_bytes(integer_or(
            section,
            "min-compressible-size-bytes",
            defaults.min_compressible_size_bytes(),
        ))
        .max_compressible_size_bytes(integer_or(
            section,
            "max-compressible-size-bytes",
            defaults.max_compressible_size_bytes(),
        ))
        .compressible_content_types(string_list_or(
            section,
            "compressible-content-types",
            defaults.compressible_content_types(),
        ))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::source::TomlSource;
    use crate::observability::RecordingSink;
    use std::path::PathBuf;
    use toml::Table;

    fn table(text: &str) -> Table {
        toml::from_str(text).unwrap()
    }

    fn resolve(text: &str) -> (ServerConfig, RecordingSink) {
        let root = table(text);
        let sink = RecordingSink::new();
        let config = resolve_server_config(&TomlSource::new(&root), &sink);
        (config, sink)
    }

    #[test]
    fn test_empty_source_yields_defaults() {
        let (config, sink) = resolve("");
        assert_eq!(config, ServerConfig::default());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_scalar_overrides() {
        let (config, _) = resolve(
            r#"
            server-name = "api"
            hostname = "0.0.0.0"
            port = 9000
            "#,
        );
        assert_eq!(config.server_name, "api");
        assert_eq!(config.hostname, "0.0.0.0");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_http_overrides() {
        let (config, sink) = resolve(
            r#"
            [http]
            max-request-size-mb = 16
            max-initial-line-length = 8192
            max-header-size-bytes = 0
            max-chunk-size-bytes = 65536
            aggregate-chunks = false
            min-compressible-size-bytes = 256
            max-compressible-size-bytes = 4096
            compressible-content-types = ["application/json", "text/csv"]
            "#,
        );
        let http = &config.http;
        assert_eq!(http.max_request_size_mb(), 16);
        assert_eq!(http.max_request_size_bytes(), 16 * 1024 * 1024);
        assert_eq!(http.max_initial_line_length(), 8192);
        assert_eq!(http.max_header_size_bytes(), 0);
        assert_eq!(http.max_chunk_size_bytes(), 65536);
        assert!(!http.aggregate_chunks());
        assert_eq!(http.min_compressible_size_bytes(), 256);
        assert_eq!(http.max_compressible_size_bytes(), 4096);
        assert_eq!(
            http.compressible_content_types(),
            &["application/json".to_string(), "text/csv".to_string()]
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_partial_http_section_keeps_other_defaults() {
        let (config, _) = resolve(
            r#"
            [http]
            max-header-size-bytes = 16384
            "#,
        );
        assert_eq!(config.http.max_header_size_bytes(), 16384);
        assert_eq!(config.http.max_compressible_size_bytes(), 1_048_576);
        assert_eq!(config.http.max_request_size_mb(), 4);
    }

    #[test]
    fn test_broken_http_section_falls_back_with_diagnostic() {
        let (config, sink) = resolve(r#"http = "fast""#);
        assert_eq!(config.http, HttpConfig::default());

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].component, "HTTP");
        assert_eq!(records[0].error.path(), "http");
    }

    #[test]
    fn test_tls_absent() {
        let (config, sink) = resolve("port = 8443");
        assert!(config.tls.is_none());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_tls_resolved() {
        let (config, sink) = resolve(
            r#"
            [tls]
            key-store-file = "/etc/ssl/server.p12"
            key-store-password = "changeit"
            trust-store-file = "/etc/ssl/trust.p12"
            trust-store-password = "trustme"
            "#,
        );
        let tls = config.tls.unwrap();
        assert_eq!(tls.key_store_path, PathBuf::from("/etc/ssl/server.p12"));
        assert_eq!(tls.key_store_password, "changeit");
        assert_eq!(tls.trust_store_path, Some(PathBuf::from("/etc/ssl/trust.p12")));
        assert_eq!(tls.trust_store_password.as_deref(), Some("trustme"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_tls_optional_fields() {
        let (config, _) = resolve(
            r#"
            [tls]
            key-store-file = "/etc/ssl/server.p12"
            trust-store-file = ""
            "#,
        );
        let tls = config.tls.unwrap();
        assert_eq!(tls.key_store_password, "");
        assert_eq!(tls.trust_store_path, None);
        assert_eq!(tls.trust_store_password, None);
    }

    #[test]
    fn test_tls_unreadable_key_store_disables_tls() {
        let (config, sink) = resolve(
            r#"
            [tls]
            key-store-file = ["not", "a", "path"]
            key-store-password = "changeit"
            "#,
        );
        assert!(config.tls.is_none());

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].component, "TLS");
        assert_eq!(records[0].error.path(), "tls.key-store-file");
    }

    #[test]
    fn test_tls_section_without_key_store_disables_tls() {
        let (config, sink) = resolve(
            r#"
            [tls]
            key-store-password = "changeit"
            "#,
        );
        assert!(config.tls.is_none());
        assert_eq!(sink.records().len(), 1);
        assert!(sink.records()[0].error.is_missing());
    }

    #[test]
    fn test_tls_wrong_structural_type() {
        let (config, sink) = resolve("tls = true");
        assert!(config.tls.is_none());
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn test_access_log() {
        let (config, _) = resolve(
            r#"
            [access-log]
            "#,
        );
        assert_eq!(config.access_log, Some(AccessLogConfig::default()));

        let (config, _) = resolve(
            r#"
            [access-log]
            format = "extended"
            buffer-size = 2048
            "#,
        );
        assert_eq!(
            config.access_log,
            Some(AccessLogConfig {
                format: AccessLogFormat::Extended,
                buffer_size: 2048,
            })
        );
    }

    #[test]
    fn test_access_log_unknown_format_is_broken() {
        let (config, sink) = resolve(
            r#"
            [access-log]
            format = "combined"
            "#,
        );
        assert!(config.access_log.is_none());

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].component, "access log");
        assert_eq!(records[0].error.path(), "access-log.format");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let root = table(
            r#"
            server-name = "api"
            [http]
            max-request-size-mb = 8
            [access-log]
            format = "common"
            "#,
        );
        let source = TomlSource::new(&root);
        let sink = RecordingSink::new();

        let first = resolve_server_config(&source, &sink);
        let second = resolve_server_config(&source, &sink);
        assert_eq!(first, second);
    }
}
