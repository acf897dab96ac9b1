//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/mathdrill/config.toml` by default. Every section is optional;
//! command-line flags and `MATHDRILL_*` variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mathdrill_core::{DEFAULT_SESSION_SIZE, TracingOutputFormat};
use mathdrill_sheets::google::{GoogleConfig, OAuthCredentials};
use mathdrill_sheets::{DEFAULT_DETAIL_RANGE, DEFAULT_SUMMARY_RANGE, TableTarget};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the mathdrill client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Where results that could not be published are kept.
    pub archive_dir: Option<PathBuf>,

    /// Quiz session settings.
    pub session: SessionSettings,

    /// Google authorization settings.
    pub google: GoogleSettings,

    /// Target spreadsheet.
    pub sheet: SheetSettings,

    /// Logging settings.
    pub log: LogSettings,
}

/// Quiz session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Number of tasks per session.
    pub size: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            size: DEFAULT_SESSION_SIZE,
        }
    }
}

/// Google authorization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// Google Cloud Console credentials JSON.
    ///
    /// Defaults to `credentials.json` in the default configuration
    /// directory, wherever `--config` points.
    pub credentials_file: Option<PathBuf>,

    /// Path to token storage.
    pub token_path: Option<PathBuf>,

    /// Open the authorization URL in a browser.
    pub open_browser: bool,

    /// HTTP request timeout in seconds.
    pub timeout: u64,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            credentials_file: None,
            token_path: None,
            open_browser: false,
            timeout: GoogleConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Target spreadsheet settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSettings {
    /// Spreadsheet identifier.
    pub spreadsheet_id: Option<String>,

    /// Range of the per-session summary table.
    pub summary_range: String,

    /// Range of the per-task detail table.
    pub detail_range: String,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            summary_range: DEFAULT_SUMMARY_RANGE.to_string(),
            detail_range: DEFAULT_DETAIL_RANGE.to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `compact` or `json`.
    pub format: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: "compact".to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathdrill")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathdrill")
    }

    /// Applies command-line and environment overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(size) = cli.session_size {
            self.session.size = size;
        }
        if let Some(ref id) = cli.spreadsheet_id {
            self.sheet.spreadsheet_id = Some(id.clone());
        }
        if let Some(ref path) = cli.credentials_file {
            self.google.credentials_file = Some(path.clone());
        }
        if let Some(ref path) = cli.token_path {
            self.google.token_path = Some(path.clone());
        }
    }

    /// Checks the settings that do not need any file to exist.
    pub fn validate(&self) -> Result<(), String> {
        if self.session.size == 0 {
            return Err("session.size must be at least 1".to_string());
        }
        if self.google.timeout == 0 {
            return Err("google.timeout must be at least 1 second".to_string());
        }
        if TracingOutputFormat::from_name(&self.log.format).is_none() {
            return Err(format!(
                "unknown log.format {:?} (expected \"compact\" or \"json\")",
                self.log.format
            ));
        }
        if self.sheet.summary_range.trim().is_empty() || self.sheet.detail_range.trim().is_empty()
        {
            return Err("sheet ranges must not be empty".to_string());
        }
        if let Some(ref id) = self.sheet.spreadsheet_id
            && id.trim().is_empty()
        {
            return Err("sheet.spreadsheet_id must not be empty".to_string());
        }
        Ok(())
    }

    /// Returns the configured log format, falling back to compact.
    pub fn log_format(&self) -> TracingOutputFormat {
        TracingOutputFormat::from_name(&self.log.format).unwrap_or_default()
    }

    /// Returns the credentials file path.
    pub fn credentials_path(&self) -> PathBuf {
        self.google
            .credentials_file
            .clone()
            .unwrap_or_else(|| Self::default_config_dir().join("credentials.json"))
    }

    /// Returns the token file path.
    pub fn token_path(&self) -> PathBuf {
        self.google
            .token_path
            .clone()
            .unwrap_or_else(GoogleConfig::default_token_path)
    }

    /// Returns the directory for unpublished results.
    pub fn archive_path(&self) -> PathBuf {
        self.archive_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("unpublished"))
    }

    /// Reads the credentials file and builds the Google configuration.
    pub fn to_google_config(&self) -> Result<GoogleConfig, String> {
        let path = self.credentials_path();
        let credentials = OAuthCredentials::from_file(&path)
            .map_err(|e| format!("{} ({})", e, path.display()))?;

        let config = GoogleConfig::new(credentials)
            .with_token_path(self.token_path())
            .with_timeout(Duration::from_secs(self.google.timeout))
            .with_open_browser(self.google.open_browser);
        config.validate()?;
        Ok(config)
    }

    /// Returns where results go.
    pub fn table_target(&self) -> Result<TableTarget, String> {
        let id = self.sheet.spreadsheet_id.as_deref().ok_or_else(|| {
            format!(
                "no spreadsheet configured. Add to {}:\n  \
                 [sheet]\n  \
                 spreadsheet_id = \"YOUR_SPREADSHEET_ID\"\n\n  \
                 Or pass --spreadsheet-id / set MATHDRILL_SPREADSHEET_ID",
                Self::default_path().display()
            )
        })?;

        Ok(TableTarget::new(id)
            .with_summary_range(&self.sheet.summary_range)
            .with_detail_range(&self.sheet.detail_range))
    }
}
