//! web-server-config
//!
//! Resolves and validates the web server configuration the way the server
//! does at startup, then reports the result.
//!
//! ```text
//! --config file.toml ──┐
//!                      ├─▶ raw table ─▶ resolve ─▶ validate ─▶ summary / JSON
//! WEB_SERVER__* env ───┘        │
//!                               └─▶ degraded sections logged as warnings
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use web_server_config::config::loader::{
    build_config, env_vars, merge_sources, read_config_file, DEFAULT_ENV_PREFIX,
};
use web_server_config::config::{ConfigError, ServerConfig};
use web_server_config::observability::logging::init_logging;
use web_server_config::TracingSink;

#[derive(Parser)]
#[command(name = "web-server-config")]
#[command(about = "Resolve and validate web server configuration", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prefix for environment overrides.
    #[arg(long, default_value = DEFAULT_ENV_PREFIX)]
    env_prefix: String,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the resolved configuration as JSON.
    #[arg(long)]
    json: bool,
}

fn resolve(cli: &Cli) -> Result<ServerConfig, ConfigError> {
    let text = match &cli.config {
        Some(path) => Some(read_config_file(path)?),
        None => None,
    };
    let table = merge_sources(text.as_deref(), &cli.env_prefix, env_vars())?;
    build_config(&table, &TracingSink)
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    tracing::info!("web-server-config v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration rejected");
            return Ok(ExitCode::FAILURE);
        }
    };

    tracing::info!(
        server_name = %config.server_name,
        bind_address = %config.bind_address(),
        tls = config.tls_enabled(),
        access_log = config.access_log.is_some(),
        max_request_size_bytes = config.http.max_request_size_bytes(),
        "Configuration valid"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    Ok(ExitCode::SUCCESS)
}
