//! Obtaining a usable credential.
//!
//! A cached credential is used as-is. Only on a cache miss does the
//! authorizer run the interactive grant: show the authorization URL, read the
//! pasted code, exchange it, and persist the result before handing it out.

use mathdrill_core::{BoxFuture, Prompter};
use tracing::{debug, info, warn};

use crate::error::{SheetsError, SheetsResult};
use crate::google::{Credential, TokenStore};

/// The identity provider half of the authorization code grant.
pub trait GrantClient: Send + Sync {
    /// Returns the URL the user must visit to grant access.
    fn authorization_url(&self) -> String;

    /// Exchanges a pasted authorization code for a credential.
    fn exchange_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, SheetsResult<Credential>>;

    /// Obtains a new access token for `credential`.
    fn refresh<'a>(&'a self, credential: &'a Credential) -> BoxFuture<'a, SheetsResult<Credential>>;
}

/// Produces credentials from a [`TokenStore`] and a [`GrantClient`].
pub struct Authorizer<'a> {
    store: &'a dyn TokenStore,
    grant: &'a dyn GrantClient,
    open_browser: bool,
}

impl<'a> Authorizer<'a> {
    pub fn new(store: &'a dyn TokenStore, grant: &'a dyn GrantClient) -> Self {
        Self {
            store,
            grant,
            open_browser: false,
        }
    }

    /// Also hand the authorization URL to the system browser.
    pub fn with_open_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    /// Returns the cached credential, or runs the grant if there is none.
    ///
    /// The prompter is only touched on a cache miss. Store failures other
    /// than a miss are returned unchanged.
    pub async fn authorize(&self, prompter: &mut dyn Prompter) -> SheetsResult<Credential> {
        match self.store.load() {
            Ok(credential) => {
                debug!("using cached credential");
                Ok(credential)
            }
            Err(e) if e.is_not_found() => {
                info!("no cached credential, starting authorization");
                self.grant(prompter).await
            }
            Err(e) => Err(e),
        }
    }

    /// Runs the interactive grant and persists the new credential.
    ///
    /// Nothing is written when the exchange fails. A credential that cannot
    /// be persisted is not returned either.
    pub async fn grant(&self, prompter: &mut dyn Prompter) -> SheetsResult<Credential> {
        let url = self.grant.authorization_url();
        prompter
            .display(&format!("Authorize this app by visiting this url: {}", url))
            .map_err(|e| {
                SheetsError::authorization("failed to show authorization URL").with_source(e)
            })?;

        if self.open_browser
            && let Err(e) = open::that(&url)
        {
            warn!("could not open browser: {}", e);
        }

        prompter
            .display("Enter the code from that page here:")
            .map_err(|e| SheetsError::authorization("failed to prompt for code").with_source(e))?;
        let line = prompter
            .read_line()
            .await
            .map_err(|e| {
                SheetsError::authorization("no authorization code entered").with_source(e)
            })?;
        let code = line.trim();

        let credential = self.grant.exchange_code(code).await.map_err(|e| {
            warn!("authorization code exchange failed: {}", e);
            SheetsError::authorization("error retrieving access token").with_source(e)
        })?;

        self.store.save(&credential).map_err(|e| {
            SheetsError::authorization("failed to store access token").with_source(e)
        })?;
        info!("authorization complete");

        Ok(credential)
    }

    /// Refreshes `credential` if it has expired and can be refreshed.
    ///
    /// Without a refresh token the credential comes back unchanged and the
    /// remote service gets to reject it.
    pub async fn ensure_fresh(&self, credential: Credential) -> SheetsResult<Credential> {
        if !credential.is_expired() {
            return Ok(credential);
        }
        if credential.refresh_token.is_none() {
            warn!("access token expired and no refresh token is cached");
            return Ok(credential);
        }

        info!("access token expired, refreshing");
        let refreshed = self.grant.refresh(&credential).await?;
        self.store.save(&refreshed)?;
        Ok(refreshed)
    }
}
