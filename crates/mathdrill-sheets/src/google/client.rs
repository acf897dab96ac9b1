//! Google Sheets API client.
//!
//! Only `spreadsheets.values.append` is needed: results are always added as
//! new rows, never read back or overwritten.

use std::time::Duration;

use mathdrill_core::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SheetsError, SheetsResult};
use crate::publisher::{AppendOutcome, Row, TableAppender};

use super::tokens::Credential;

/// Base URL for Google Sheets API v4.
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Values are parsed as if typed into the UI (numbers, dates, formulas).
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// Appended values go into newly inserted rows.
const INSERT_DATA_OPTION: &str = "INSERT_ROWS";

/// Google Sheets API client bound to one credential.
#[derive(Debug)]
pub struct SheetsClient {
    http_client: reqwest::Client,
    access_token: String,
}

impl SheetsClient {
    /// Creates a client that authenticates with `credential`.
    pub fn new(credential: &Credential, timeout: Duration) -> SheetsResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("mathdrill/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SheetsError::internal("failed to create HTTP client").with_source(e))?;

        Ok(Self {
            http_client,
            access_token: credential.access_token.clone(),
        })
    }

    /// Appends `rows` after the table found at `range`.
    pub async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Row>,
    ) -> SheetsResult<AppendOutcome> {
        let url = append_url(spreadsheet_id, range);
        let body = serde_json::to_string(&ValueRange { values: rows })
            .map_err(|e| SheetsError::internal("failed to serialize rows").with_source(e))?;

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("valueInputOption", VALUE_INPUT_OPTION),
                ("insertDataOption", INSERT_DATA_OPTION),
            ])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    format!("request failed: {}", e)
                };
                SheetsError::network(message).with_source(e)
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SheetsError::rate_limited("rate limit exceeded"));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SheetsError::authentication(
                "access token expired or invalid",
            ));
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(SheetsError::authentication(
                "access denied to spreadsheet",
            ));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SheetsError::server(format!(
                "spreadsheet {} or range {} not found",
                spreadsheet_id, range
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::server(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SheetsError::network("failed to read response").with_source(e))?;

        let outcome = parse_append_response(&body)?;
        debug!(
            range,
            updated_range = outcome.updated_range.as_deref().unwrap_or("?"),
            updated_rows = outcome.updated_rows,
            "rows appended"
        );
        Ok(outcome)
    }
}

impl TableAppender for SheetsClient {
    fn append<'a>(
        &'a self,
        spreadsheet_id: &'a str,
        range: &'a str,
        rows: Vec<Row>,
    ) -> BoxFuture<'a, SheetsResult<AppendOutcome>> {
        Box::pin(self.append_values(spreadsheet_id, range, rows))
    }
}

/// Builds the `values:append` URL. The range is A1 notation and must be
/// percent-encoded as a path segment (`!` and `:` included).
fn append_url(spreadsheet_id: &str, range: &str) -> String {
    format!(
        "{}/{}/values/{}:append",
        SHEETS_API_BASE,
        urlencoding::encode(spreadsheet_id),
        urlencoding::encode(range),
    )
}

fn parse_append_response(body: &str) -> SheetsResult<AppendOutcome> {
    let response: AppendValuesResponse = serde_json::from_str(body)
        .map_err(|e| SheetsError::invalid_response("failed to parse response").with_source(e))?;

    let updates = response.updates.unwrap_or_default();
    Ok(AppendOutcome {
        table_range: response.table_range,
        updated_range: updates.updated_range,
        updated_rows: updates.updated_rows.unwrap_or(0),
    })
}

/// Request body for `values.append`.
#[derive(Debug, Serialize)]
struct ValueRange {
    values: Vec<Row>,
}

/// Response from `values.append`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendValuesResponse {
    #[allow(dead_code)]
    spreadsheet_id: Option<String>,
    table_range: Option<String>,
    updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    updated_range: Option<String>,
    updated_rows: Option<usize>,
}
