//! Loading configuration files with environment overlays.

use std::fs;

use web_server_config::config::loader::{build_config, merge_sources, parse_config};
use web_server_config::config::{load_config, ConfigError, HttpConfig, ValidationError};
use web_server_config::observability::RecordingSink;

mod common;

const EXAMPLE: &str = include_str!("../web-server.example.toml");

#[test]
fn test_example_file_matches_defaults() {
    let table = parse_config(EXAMPLE).unwrap();
    let config = build_config(&table, &RecordingSink::new()).unwrap();

    assert_eq!(config.server_name, "WebServer");
    assert_eq!(config.http, HttpConfig::default());
    assert!(config.access_log.is_some());
    assert!(config.tls.is_none());
}

#[test]
fn test_load_tls_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let key_store = common::store_file(b"key");
    let path = dir.path().join("server.toml");
    fs::write(
        &path,
        format!(
            r#"
            port = 8443
            [tls]
            key-store-file = "{}"
            key-store-password = "changeit"
            "#,
            common::toml_path(&key_store)
        ),
    )
    .unwrap();

    let sink = RecordingSink::new();
    let config = load_config(&path, "WEB_SERVER_CONFIG_LOADING_TEST", &sink).unwrap();

    assert!(config.tls_enabled());
    assert_eq!(config.bind_address(), "localhost:8443");
    assert!(sink.is_empty());
}

#[test]
fn test_invalid_file_value_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.toml");
    fs::write(&path, "[http]\nmax-initial-line-length = 0\n").unwrap();

    let err = load_config(&path, "WEB_SERVER_CONFIG_LOADING_TEST", &RecordingSink::new())
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Validation(ValidationError::InvalidMaxInitialLineLength(0))
    ));
}

#[test]
fn test_env_overlay_fixes_broken_section() {
    let text = r#"access-log = 5"#;
    let table = common::table(text);

    let sink = RecordingSink::new();
    let before = build_config(&table, &sink).unwrap();
    assert!(before.access_log.is_none());
    assert_eq!(sink.records().len(), 1);

    let table = merge_sources(
        Some(text),
        "WEB",
        vec![("WEB__ACCESS_LOG__BUFFER_SIZE".to_string(), "64".to_string())],
    )
    .unwrap();
    let after = build_config(&table, &RecordingSink::new()).unwrap();
    assert_eq!(after.access_log.map(|a| a.buffer_size), Some(64));
}
