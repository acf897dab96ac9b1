//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig, path: Option<&Path>) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", config_path(path).display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
///
/// The credentials file is only checked if it exists, so a fresh install
/// without one still validates.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate().map_err(ClientError::Config)?;

    let credentials = config.credentials_path();
    if credentials.exists() {
        config.to_google_config().map_err(|e| {
            ClientError::Config(format!("invalid Google credentials: {}", e))
        })?;
        println!("Google credentials are valid.");
    } else {
        println!("No credentials file at {}.", credentials.display());
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: Option<&Path>) -> ClientResult<()> {
    println!("config: {}", config_path(path).display());
    Ok(())
}

fn config_path(path: Option<&Path>) -> std::path::PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(ClientConfig::default_path)
}
