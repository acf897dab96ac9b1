//! OAuth 2.0 authorization code flow for Google APIs.
//!
//! The user opens the authorization URL, grants access, and pastes the code
//! Google shows back into the terminal. The code is exchanged together with
//! a PKCE verifier, so an intercepted code alone is useless.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use mathdrill_core::BoxFuture;
use rand::Rng as _;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::authorizer::GrantClient;
use crate::error::{SheetsError, SheetsResult};

use super::config::GoogleConfig;
use super::tokens::Credential;

/// Google OAuth endpoints.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// The PKCE code verifier length (in bytes, before base64 encoding).
const CODE_VERIFIER_LENGTH: usize = 32;

/// OAuth client for Google's token endpoint.
#[derive(Debug)]
pub struct OAuthClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    pkce: PkceFlow,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a client for the given configuration.
    ///
    /// The PKCE verifier is generated here and reused by the URL and the
    /// exchange, so one client serves exactly one grant.
    pub fn new(config: &GoogleConfig) -> SheetsResult<Self> {
        config.validate().map_err(SheetsError::configuration)?;

        let redirect_uri = config
            .credentials
            .redirect_uri()
            .ok_or_else(|| SheetsError::configuration("no redirect URI configured"))?
            .to_string();

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SheetsError::internal("failed to create HTTP client").with_source(e))?;

        Ok(Self {
            client_id: config.credentials.client_id.clone(),
            client_secret: config.credentials.client_secret.clone(),
            redirect_uri,
            scopes: config.scopes.clone(),
            pkce: PkceFlow::new(),
            http_client,
        })
    }

    /// Returns the Google authorization URL for this client.
    pub fn build_auth_url(&self) -> String {
        self.pkce
            .build_auth_url(&self.client_id, &self.redirect_uri, &self.scopes)
    }

    /// Exchanges an authorization code for a credential.
    pub async fn exchange(&self, code: &str) -> SheetsResult<Credential> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("code_verifier", self.pkce.verifier.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let token = self.post_token(&params, "token exchange").await?;
        info!("successfully obtained tokens");

        let scope = token.scope.clone().unwrap_or_else(|| self.scopes.join(" "));
        Ok(token.into_credential().with_scope(scope))
    }

    /// Uses the refresh token of `credential` to obtain a new access token.
    pub async fn refresh_credential(&self, credential: &Credential) -> SheetsResult<Credential> {
        let refresh_token = credential.refresh_token.as_deref().ok_or_else(|| {
            SheetsError::authentication("no refresh token - re-authorization required")
        })?;

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let token = self.post_token(&params, "token refresh").await?;
        info!("successfully refreshed access token");

        // Google may rotate the refresh token; keep the old one otherwise.
        let mut refreshed = credential.refreshed(token.access_token, token.expires_in);
        if let Some(rotated) = token.refresh_token {
            refreshed.refresh_token = Some(rotated);
        }
        Ok(refreshed)
    }

    async fn post_token(&self, params: &[(&str, &str)], what: &str) -> SheetsResult<TokenResponse> {
        debug!("{} request to {}", what, GOOGLE_TOKEN_URL);

        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(params)
            .send()
            .await
            .map_err(|e| SheetsError::network(format!("{} request failed", what)).with_source(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SheetsError::network("failed to read token response").with_source(e))?;

        if !status.is_success() {
            return Err(SheetsError::authentication(format!(
                "{} failed ({}): {}",
                what, status, body
            )));
        }

        TokenResponse::parse(&body)
    }
}

impl GrantClient for OAuthClient {
    fn authorization_url(&self) -> String {
        self.build_auth_url()
    }

    fn exchange_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, SheetsResult<Credential>> {
        Box::pin(self.exchange(code))
    }

    fn refresh<'a>(
        &'a self,
        credential: &'a Credential,
    ) -> BoxFuture<'a, SheetsResult<Credential>> {
        Box::pin(self.refresh_credential(credential))
    }
}

/// PKCE verifier/challenge pair (RFC 7636).
#[derive(Debug)]
pub struct PkceFlow {
    /// The code verifier (high-entropy random string).
    pub verifier: String,
    /// The code challenge (SHA-256 of the verifier, base64url encoded).
    pub challenge: String,
}

impl PkceFlow {
    /// Creates a new flow with a random verifier.
    pub fn new() -> Self {
        let verifier = Self::generate_verifier();
        let challenge = Self::compute_challenge(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    fn generate_verifier() -> String {
        let mut rng = rand::rng();
        let bytes: Vec<u8> = (0..CODE_VERIFIER_LENGTH).map(|_| rng.random()).collect();
        URL_SAFE_NO_PAD.encode(&bytes)
    }

    fn compute_challenge(verifier: &str) -> String {
        let digest = Sha256::digest(verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(digest)
    }

    /// Builds the Google OAuth authorization URL.
    ///
    /// `access_type=offline` asks for a refresh token so later runs can stay
    /// authorized without user interaction.
    pub fn build_auth_url(&self, client_id: &str, redirect_uri: &str, scopes: &[String]) -> String {
        let scope = scopes.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&access_type=offline",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&self.challenge),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

impl TokenResponse {
    fn parse(body: &str) -> SheetsResult<Self> {
        serde_json::from_str(body)
            .map_err(|e| SheetsError::invalid_response("invalid token response").with_source(e))
    }

    fn into_credential(self) -> Credential {
        let mut credential =
            Credential::new(self.access_token, self.refresh_token, self.expires_in);
        if let Some(token_type) = self.token_type {
            credential = credential.with_token_type(token_type);
        }
        credential
    }
}
