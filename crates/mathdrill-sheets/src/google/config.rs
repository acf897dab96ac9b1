//! Google client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// OAuth 2.0 client credentials for an installed application.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
    /// Registered redirect URIs. The first one is used for the grant.
    pub redirect_uris: Vec<String>,
}

/// Structure of Google's OAuth credentials JSON file.
///
/// Supports the Cloud Console format (an "installed" or "web" section) and a
/// flat format with the fields at root level.
#[derive(Debug, Deserialize)]
struct GoogleCredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl OAuthCredentials {
    /// Creates new OAuth credentials.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uris: Vec<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uris,
        }
    }

    /// Loads credentials from a Google Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("failed to read credentials file: {}", e))?;
        Self::from_json(&content)
    }

    /// Parses credentials from a Google credentials JSON string.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: GoogleCredentialsFile = serde_json::from_str(json)
            .map_err(|e| format!("failed to parse credentials JSON: {}", e))?;

        if let Some(creds) = file.installed.or(file.web) {
            return Ok(Self::new(
                creds.client_id,
                creds.client_secret,
                creds.redirect_uris,
            ));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret, file.redirect_uris));
        }

        Err("credentials file must contain an 'installed'/'web' section or 'client_id'/'client_secret' at root level".to_string())
    }

    /// Returns the redirect URI used for the grant (the first registered one).
    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uris.first().map(String::as_str)
    }

    /// Validates that the credentials appear to be correctly formatted.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        if self.redirect_uri().is_none_or(str::is_empty) {
            return Err("at least one redirect URI is required");
        }
        Ok(())
    }
}

/// Configuration for authorizing against and writing to Google Sheets.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client credentials.
    pub credentials: OAuthCredentials,

    /// Where the cached token lives.
    ///
    /// Defaults to `~/.config/mathdrill/token.json`.
    pub token_path: PathBuf,

    /// Timeout applied to every HTTP request.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,

    /// Scopes requested during the grant.
    pub scopes: Vec<String>,

    /// Also try to open the authorization URL in a browser.
    pub open_browser: bool,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Read/write access to spreadsheets.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/spreadsheets";

    /// Creates a new configuration with the given credentials.
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            token_path: Self::default_token_path(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("mathdrill/{}", env!("CARGO_PKG_VERSION")),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
            open_browser: false,
        }
    }

    /// Returns the default token path.
    pub fn default_token_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathdrill")
            .join("token.json")
    }

    /// Sets the token path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Enables opening the authorization URL in a browser.
    pub fn with_open_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> OAuthCredentials {
        OAuthCredentials::new(
            "test-client.apps.googleusercontent.com",
            "test-secret",
            vec!["http://localhost".to_string()],
        )
    }

    #[test]
    fn credentials_validation() {
        assert!(test_credentials().validate().is_ok());

        let empty_id = OAuthCredentials {
            client_id: String::new(),
            ..test_credentials()
        };
        assert!(empty_id.validate().is_err());

        let bad_id = OAuthCredentials {
            client_id: "bad-id".to_string(),
            ..test_credentials()
        };
        assert!(bad_id.validate().is_err());

        let empty_secret = OAuthCredentials {
            client_secret: String::new(),
            ..test_credentials()
        };
        assert!(empty_secret.validate().is_err());

        let no_redirect = OAuthCredentials {
            redirect_uris: vec![],
            ..test_credentials()
        };
        assert_eq!(
            no_redirect.validate(),
            Err("at least one redirect URI is required")
        );
    }

    #[test]
    fn first_redirect_uri_wins() {
        let creds = OAuthCredentials {
            redirect_uris: vec![
                "urn:ietf:wg:oauth:2.0:oob".to_string(),
                "http://localhost".to_string(),
            ],
            ..test_credentials()
        };
        assert_eq!(creds.redirect_uri(), Some("urn:ietf:wg:oauth:2.0:oob"));
    }

    #[test]
    fn credentials_from_json_installed() {
        let json = r#"{
            "installed": {
                "client_id": "test-id.apps.googleusercontent.com",
                "project_id": "quiz-project",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "client_secret": "test-secret",
                "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob", "http://localhost"]
            }
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "test-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "test-secret");
        assert_eq!(creds.redirect_uris.len(), 2);
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn credentials_from_json_web() {
        let json = r#"{
            "web": {
                "client_id": "web-id.apps.googleusercontent.com",
                "client_secret": "web-secret",
                "redirect_uris": ["http://localhost:8080"]
            }
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.redirect_uri(), Some("http://localhost:8080"));
    }

    #[test]
    fn credentials_from_json_flat() {
        let json = r#"{
            "client_id": "flat-id.apps.googleusercontent.com",
            "client_secret": "flat-secret"
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "flat-id.apps.googleusercontent.com");
        assert!(creds.redirect_uris.is_empty());
        assert!(creds.validate().is_err());
    }

    #[test]
    fn credentials_from_json_invalid() {
        let result = OAuthCredentials::from_json(r#"{ "other": {} }"#);
        assert!(result.unwrap_err().contains("client_id"));

        let result = OAuthCredentials::from_json("not json");
        assert!(result.unwrap_err().contains("parse"));
    }

    #[test]
    fn config_defaults() {
        let config = GoogleConfig::new(test_credentials());
        assert_eq!(config.scopes, vec![GoogleConfig::DEFAULT_SCOPE.to_string()]);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.token_path.ends_with("mathdrill/token.json"));
        assert!(!config.open_browser);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_methods() {
        let config = GoogleConfig::new(test_credentials())
            .with_token_path("/tmp/token.json")
            .with_timeout(Duration::from_secs(5))
            .with_open_browser(true);

        assert_eq!(config.token_path, PathBuf::from("/tmp/token.json"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.open_browser);

        let no_scopes = config.with_scopes(vec![]);
        assert!(no_scopes.validate().is_err());
    }
}
