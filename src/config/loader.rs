//! Configuration loading from disk and environment.
//!
//! The file and the `{prefix}__SECTION__KEY` variables are layered with the
//! `config` crate, then the merged tree is handed to [`TomlSource`] so the
//! resolvers see one loosely typed table.

use std::fs;
use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File, FileFormat};
use thiserror::Error;
use toml::{Table, Value};

use crate::config::resolver::resolve_server_config;
use crate::config::schema::ServerConfig;
use crate::config::source::TomlSource;
use crate::config::validation::ValidationError;
use crate::observability::DiagnosticSink;

/// Default prefix for environment overrides (`WEB_SERVER__HTTP__MAX_REQUEST_SIZE_MB`).
pub const DEFAULT_ENV_PREFIX: &str = "WEB_SERVER";

/// Separator between the prefix, section and key of an override.
const ENV_SEPARATOR: &str = "__";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to merge config sources: {0}")]
    Merge(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}

/// Parse TOML text into a raw table.
pub fn parse_config(text: &str) -> Result<Table, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Read a configuration file's text.
pub fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Process environment, skipping any variable whose name or value is not UTF-8.
pub fn env_vars() -> ::config::Map<String, String> {
    std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Layer TOML `text` under the `{prefix}__SECTION__KEY` variables in `vars`.
///
/// Environment keys arrive lowercased and snake_case; they are rewritten to
/// kebab-case (`WEB_SERVER__ACCESS_LOG__BUFFER_SIZE` sets
/// `access-log.buffer-size`) and win over the file on collision. Values stay
/// strings; the source coerces them on read.
pub fn merge_sources<I>(text: Option<&str>, prefix: &str, vars: I) -> Result<Table, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut builder = Config::builder();
    if let Some(text) = text {
        builder = builder.add_source(File::from_str(text, FileFormat::Toml));
    }
    builder = builder.add_source(
        Environment::with_prefix(prefix)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .source(Some(vars.into_iter().collect())),
    );

    let merged: Table = builder.build()?.try_deserialize()?;
    Ok(kebab_keys(merged))
}

/// Rewrite `_` in keys to `-`, letting rewritten keys overlay kebab-case ones.
fn kebab_keys(table: Table) -> Table {
    let (snake, kebab): (Vec<_>, Vec<_>) =
        table.into_iter().partition(|(key, _)| key.contains('_'));

    let mut merged = Table::new();
    for (key, value) in kebab.into_iter().chain(snake) {
        let value = match value {
            Value::Table(inner) => Value::Table(kebab_keys(inner)),
            other => other,
        };
        overlay(&mut merged, key.replace('_', "-"), value);
    }
    merged
}

/// Tables merge key by key; anything else replaces what was there.
fn overlay(table: &mut Table, key: String, value: Value) {
    match table.get_mut(&key) {
        Some(Value::Table(existing)) if value.is_table() => {
            if let Value::Table(incoming) = value {
                for (key, value) in incoming {
                    overlay(existing, key, value);
                }
            }
        }
        _ => {
            table.insert(key, value);
        }
    }
}

/// Resolve and validate a raw table.
pub fn build_config(table: &Table, sink: &dyn DiagnosticSink) -> Result<ServerConfig, ConfigError> {
    let config = resolve_server_config(&TomlSource::new(table), sink);
    config.validate()?;
    Ok(config)
}

/// Load, overlay the process environment, resolve and validate.
pub fn load_config(
    path: &Path,
    env_prefix: &str,
    sink: &dyn DiagnosticSink,
) -> Result<ServerConfig, ConfigError> {
    let text = read_config_file(path)?;
    let table = merge_sources(Some(&text), env_prefix, env_vars())?;

    let config = build_config(&table, sink)?;
    tracing::info!(
        path = %path.display(),
        server_name = %config.server_name,
        bind_address = %config.bind_address(),
        "Configuration loaded"
    );
    Ok(config)
}
