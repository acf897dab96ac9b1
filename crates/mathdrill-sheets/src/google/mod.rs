//! Google implementations of the token store, the grant and the table store.
//!
//! # Authentication Flow
//!
//! 1. The user provides an OAuth client (the Cloud Console `credentials.json`)
//! 2. The authorization URL is printed, and optionally opened in a browser
//! 3. The user grants access and Google shows an authorization code
//! 4. The code is pasted back and exchanged, together with the PKCE verifier
//! 5. The credential is written to the token file for later runs
//!
//! # Example
//!
//! ```ignore
//! use mathdrill_sheets::google::{FileTokenStore, GoogleConfig, OAuthClient, OAuthCredentials};
//! use mathdrill_sheets::Authorizer;
//!
//! let credentials = OAuthCredentials::from_file("credentials.json")?;
//! let config = GoogleConfig::new(credentials);
//! let store = FileTokenStore::new(&config.token_path);
//! let client = OAuthClient::new(&config)?;
//!
//! let credential = Authorizer::new(&store, &client).authorize(&mut prompter).await?;
//! ```

mod client;
mod config;
mod oauth;
mod tokens;

pub use client::SheetsClient;
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{OAuthClient, PkceFlow};
pub use tokens::{Credential, FileTokenStore, TokenStore};
