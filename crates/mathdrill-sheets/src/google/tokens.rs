//! Credential model and token persistence.
//!
//! The on-disk format matches the token JSON Google's own client libraries
//! write (`access_token`, `refresh_token`, `expiry_date` in epoch
//! milliseconds), so an existing `token.json` keeps working.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SheetsError, SheetsResult};

/// An authorization handle for the Sheets API.
///
/// A credential is never modified in place; a refresh yields a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The bearer token for API requests.
    pub access_token: String,

    /// The token used to obtain new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// When the access token expires.
    #[serde(
        rename = "expiry_date",
        default,
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,

    /// Space-separated granted scopes, as returned by the token endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Token type, normally `Bearer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Credential {
    /// Creates a credential from token endpoint data.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(expiry_from_now),
            scope: None,
            token_type: None,
        }
    }

    /// Sets the granted scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Sets the token type.
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// Returns a new credential carrying a refreshed access token.
    ///
    /// The refresh token, scope and type carry over.
    pub fn refreshed(&self, access_token: impl Into<String>, expires_in_secs: Option<i64>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: expires_in_secs.map(expiry_from_now),
            ..self.clone()
        }
    }

    /// Returns true if the access token is expired or about to expire.
    ///
    /// Tokens without an expiry are treated as valid.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Utc::now() >= expires_at)
    }
}

/// Expiry with a one-minute safety margin.
fn expiry_from_now(secs: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(secs) - Duration::seconds(60)
}

/// Persistence for a single cached credential.
pub trait TokenStore: Send + Sync {
    /// Loads the cached credential.
    ///
    /// Fails with [`SheetsErrorCode::NotFound`](crate::SheetsErrorCode::NotFound)
    /// when there is nothing usable cached.
    fn load(&self) -> SheetsResult<Credential>;

    /// Replaces whatever is cached with `credential`.
    fn save(&self, credential: &Credential) -> SheetsResult<()>;
}

/// A token store backed by one JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the token file. Returns whether a file was removed.
    pub fn clear(&self) -> SheetsResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).map_err(|e| {
            SheetsError::io(format!("failed to remove token file {:?}", self.path)).with_source(e)
        })?;
        info!("cleared token at {:?}", self.path);
        Ok(true)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> SheetsResult<Credential> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            debug!("no readable token at {:?}: {}", self.path, e);
            SheetsError::not_found(format!("no token at {:?}", self.path)).with_source(e)
        })?;

        let credential: Credential = serde_json::from_str(&content).map_err(|e| {
            warn!("ignoring unparsable token file {:?}: {}", self.path, e);
            SheetsError::not_found(format!("token file {:?} is not valid", self.path))
                .with_source(e)
        })?;

        info!("loaded token from {:?}", self.path);
        Ok(credential)
    }

    fn save(&self, credential: &Credential) -> SheetsResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                SheetsError::io(format!("failed to create token directory {:?}", parent))
                    .with_source(e)
            })?;
        }

        let content = serde_json::to_string_pretty(credential).map_err(|e| {
            SheetsError::internal("failed to serialize token").with_source(e)
        })?;

        // Write to a sibling temp file, then rename over the old one.
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content).map_err(|e| {
            SheetsError::io(format!("failed to write token file {:?}", temp_path)).with_source(e)
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            SheetsError::io(format!("failed to rename token file to {:?}", self.path))
                .with_source(e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            if let Err(e) = fs::set_permissions(&self.path, perms) {
                warn!("could not restrict permissions on {:?}: {}", self.path, e);
            }
        }

        info!("token stored to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetsErrorCode;

    fn sample() -> Credential {
        Credential::new("access-token", Some("refresh-token".to_string()), Some(3600))
            .with_scope("https://www.googleapis.com/auth/spreadsheets")
            .with_token_type("Bearer")
    }

    #[test]
    fn credential_creation() {
        let credential = sample();
        assert_eq!(credential.access_token, "access-token");
        assert_eq!(credential.refresh_token.as_deref(), Some("refresh-token"));
        assert!(credential.expires_at.is_some());
        assert!(!credential.is_expired());
    }

    #[test]
    fn credential_expiry() {
        let mut credential = sample();
        credential.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(credential.is_expired());

        credential.expires_at = None;
        assert!(!credential.is_expired());
    }

    #[test]
    fn refreshed_credential_keeps_refresh_token() {
        let mut old = sample();
        old.expires_at = Some(Utc::now() - Duration::hours(1));

        let new = old.refreshed("new-access", Some(3600));
        assert_eq!(new.access_token, "new-access");
        assert_eq!(new.refresh_token, old.refresh_token);
        assert_eq!(new.scope, old.scope);
        assert!(!new.is_expired());
        assert!(old.is_expired());
    }

    #[test]
    fn parses_google_token_json() {
        let json = r#"{
            "access_token": "ya29.a0Af",
            "refresh_token": "1//0g",
            "scope": "https://www.googleapis.com/auth/spreadsheets",
            "token_type": "Bearer",
            "expiry_date": 1710496800000
        }"#;

        let credential: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(credential.access_token, "ya29.a0Af");
        assert_eq!(credential.refresh_token.as_deref(), Some("1//0g"));
        assert_eq!(credential.expires_at.unwrap().timestamp(), 1_710_496_800);
        assert_eq!(credential.token_type.as_deref(), Some("Bearer"));
    }

    #[test]
    fn parses_minimal_token_json() {
        let credential: Credential = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(credential.access_token, "abc");
        assert!(credential.refresh_token.is_none());
        assert!(credential.expires_at.is_none());
    }

    #[test]
    fn file_store_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");
        let store = FileTokenStore::new(&path);

        store.save(&sample()).unwrap();
        assert!(path.exists());

        let loaded = FileTokenStore::new(&path).load().unwrap();
        assert_eq!(loaded.access_token, "access-token");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh-token"));
    }

    #[test]
    fn file_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));

        store.save(&sample()).unwrap();
        store.save(&Credential::new("second", None, None)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.access_token, "second");
        assert!(loaded.refresh_token.is_none());
        assert!(!dir.path().join("token.json.tmp").exists());
    }

    #[test]
    fn file_store_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        let err = store.load().unwrap_err();
        assert_eq!(err.code(), SheetsErrorCode::NotFound);
    }

    #[test]
    fn file_store_garbage_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FileTokenStore::new(&path).load().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn file_store_save_failure_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("token.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let err = FileTokenStore::new(&path).save(&sample()).unwrap_err();
        assert_eq!(err.code(), SheetsErrorCode::Io);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        FileTokenStore::new(&path).save(&sample()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn file_store_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        assert!(!store.clear().unwrap());

        store.save(&sample()).unwrap();
        assert!(store.clear().unwrap());
        assert!(store.load().unwrap_err().is_not_found());
    }
}
