//! Shared utilities for configuration integration tests.

use std::io::Write;

use tempfile::NamedTempFile;
use toml::Table;
use web_server_config::config::{ServerConfig, TomlSource};
use web_server_config::config::resolve_server_config;
use web_server_config::observability::RecordingSink;

/// Parse inline TOML into a raw table.
pub fn table(text: &str) -> Table {
    toml::from_str(text).unwrap()
}

/// Resolve inline TOML, returning the config and the diagnostics it produced.
#[allow(dead_code)]
pub fn resolve(text: &str) -> (ServerConfig, RecordingSink) {
    let root = table(text);
    let sink = RecordingSink::new();
    let config = resolve_server_config(&TomlSource::new(&root), &sink);
    (config, sink)
}

/// Create a throwaway store file (key store or trust store).
pub fn store_file(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file
}

/// TOML-safe rendering of a temp file path.
#[allow(dead_code)]
pub fn toml_path(file: &NamedTempFile) -> String {
    file.path().display().to_string().replace('\\', "\\\\")
}
