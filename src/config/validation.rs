//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation of a fully resolved [`ServerConfig`]
//! - Check that TLS key and trust stores resolve to regular files
//! - Validate value ranges (port > 0, HTTP limits)
//!
//! # Design Decisions
//! - Fail fast: returns the first violation, in a fixed order
//! - Runs on demand, never at construction, so partial configs can exist in tests
//! - Header and chunk sizes reject only negatives; zero is accepted

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{HttpConfig, ServerConfig, TlsConfig};

/// A configuration invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server name must be specified")]
    MissingServerName,

    #[error("hostname must be specified")]
    MissingHostname,

    #[error("port must be greater than 0, got {0}")]
    InvalidPort(i64),

    #[error("TLS key store path must be specified")]
    MissingKeyStorePath,

    #[error("TLS key store {} does not exist", .0.display())]
    KeyStoreNotFound(PathBuf),

    #[error("TLS key store {} is not a regular file", .0.display())]
    KeyStoreNotAFile(PathBuf),

    #[error("TLS key store password must be specified")]
    MissingKeyStorePassword,

    #[error("TLS trust store {} does not exist", .0.display())]
    TrustStoreNotFound(PathBuf),

    #[error("TLS trust store {} is not a regular file", .0.display())]
    TrustStoreNotAFile(PathBuf),

    #[error("TLS trust store password must be specified when a trust store is configured")]
    MissingTrustStorePassword,

    #[error("HTTP max request size must be greater than 0 MB, got {0}")]
    InvalidMaxRequestSize(i64),

    #[error("HTTP max initial line length must be greater than 0, got {0}")]
    InvalidMaxInitialLineLength(i64),

    #[error("HTTP max header size must not be negative, got {0}")]
    InvalidMaxHeaderSize(i64),

    #[error("HTTP max chunk size must not be negative, got {0}")]
    InvalidMaxChunkSize(i64),
}

/// Validate a resolved configuration, returning the first violation found.
///
/// `http` is not optional in [`ServerConfig`], so the "HTTP section present"
/// check holds by construction and sits between the TLS and HTTP-limit checks.
pub fn validate_config(config: &ServerConfig) -> Result<(), ValidationError> {
    if config.server_name.is_empty() {
        return Err(ValidationError::MissingServerName);
    }
    if config.hostname.is_empty() {
        return Err(ValidationError::MissingHostname);
    }
    if config.port <= 0 {
        return Err(ValidationError::InvalidPort(config.port));
    }
    if let Some(tls) = &config.tls {
        validate_tls(tls)?;
    }
    validate_http(&config.http)
}

fn validate_tls(tls: &TlsConfig) -> Result<(), ValidationError> {
    if tls.key_store_path.as_os_str().is_empty() {
        return Err(ValidationError::MissingKeyStorePath);
    }
    check_regular_file(
        &tls.key_store_path,
        ValidationError::KeyStoreNotFound,
        ValidationError::KeyStoreNotAFile,
    )?;
    if tls.key_store_password.is_empty() {
        return Err(ValidationError::MissingKeyStorePassword);
    }

    // A trust store is optional, but once named it needs its password.
    if let Some(trust_store) = &tls.trust_store_path {
        check_regular_file(
            trust_store,
            ValidationError::TrustStoreNotFound,
            ValidationError::TrustStoreNotAFile,
        )?;
        match tls.trust_store_password.as_deref() {
            Some(password) if !password.is_empty() => {}
            _ => return Err(ValidationError::MissingTrustStorePassword),
        }
    }
    Ok(())
}

fn validate_http(http: &HttpConfig) -> Result<(), ValidationError> {
    if http.max_request_size_mb() <= 0 {
        return Err(ValidationError::InvalidMaxRequestSize(
            http.max_request_size_mb(),
        ));
    }
    if http.max_initial_line_length() <= 0 {
        return Err(ValidationError::InvalidMaxInitialLineLength(
            http.max_initial_line_length(),
        ));
    }
    if http.max_header_size_bytes() < 0 {
        return Err(ValidationError::InvalidMaxHeaderSize(
            http.max_header_size_bytes(),
        ));
    }
    if http.max_chunk_size_bytes() < 0 {
        return Err(ValidationError::InvalidMaxChunkSize(
            http.max_chunk_size_bytes(),
        ));
    }
    Ok(())
}

/// Metadata follows symlinks, so a link to a regular file passes.
fn check_regular_file(
    path: &Path,
    not_found: fn(PathBuf) -> ValidationError,
    not_a_file: fn(PathBuf) -> ValidationError,
) -> Result<(), ValidationError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(not_a_file(path.to_path_buf())),
        Err(_) => Err(not_found(path.to_path_buf())),
    }
}
