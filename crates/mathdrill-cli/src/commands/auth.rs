//! Authorization commands.

use mathdrill_core::Prompter;
use mathdrill_sheets::google::{FileTokenStore, OAuthClient};
use mathdrill_sheets::{Authorizer, TokenStore};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Run the Google authorization flow and cache the token.
///
/// With a cached token and no `force`, nothing happens.
pub async fn login(
    config: &ClientConfig,
    force: bool,
    prompter: &mut dyn Prompter,
) -> ClientResult<()> {
    let google = config.to_google_config().map_err(ClientError::Config)?;
    let store = FileTokenStore::new(&google.token_path);

    if !force && store.load().is_ok() {
        println!("Already authorized ({}).", store.path().display());
        println!("Use --force to re-authorize.");
        return Ok(());
    }

    let client = OAuthClient::new(&google)?;
    Authorizer::new(&store, &client)
        .with_open_browser(google.open_browser)
        .grant(prompter)
        .await?;

    info!("Google authorization successful");
    println!("Token stored to {}", store.path().display());
    Ok(())
}

/// Remove the cached token.
pub fn logout(config: &ClientConfig) -> ClientResult<()> {
    let store = FileTokenStore::new(config.token_path());
    if store.clear()? {
        println!("Removed cached token at {}.", store.path().display());
    } else {
        println!("No cached token at {}.", store.path().display());
    }
    Ok(())
}
