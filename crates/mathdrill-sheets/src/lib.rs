//! Authorization and result publishing against Google Sheets.
//!
//! - [`Authorizer`] - Turns a [`TokenStore`] and a [`GrantClient`] into a credential
//! - [`ResultPublisher`] - Appends a session result through a [`TableAppender`]
//! - [`google`] - File token cache, OAuth client and Sheets API client
//! - [`SheetsError`] - Error type shared by all of the above
//!
//! # Example
//!
//! ```ignore
//! use mathdrill_sheets::{ResultPublisher, TableTarget};
//! use mathdrill_sheets::google::SheetsClient;
//!
//! let client = SheetsClient::new(&credential, timeout)?;
//! ResultPublisher::new(&client)
//!     .publish(&TableTarget::new(spreadsheet_id), &result)
//!     .await?;
//! ```

pub mod authorizer;
pub mod error;
pub mod google;
pub mod publisher;

pub use authorizer::{Authorizer, GrantClient};
pub use error::{SheetsError, SheetsErrorCode, SheetsResult};
pub use google::{Credential, FileTokenStore, TokenStore};
pub use publisher::{
    AppendOutcome, DEFAULT_DETAIL_RANGE, DEFAULT_SUMMARY_RANGE, ResultPublisher, Row,
    TableAppender, TableTarget, detail_rows, summary_row,
};
