//! The default command: authorize, run a quiz session, publish the result.

use std::path::Path;

use mathdrill_core::{Prompter, RandomTaskSource, SessionResult, SessionRunner};
use mathdrill_sheets::google::{FileTokenStore, OAuthClient, SheetsClient};
use mathdrill_sheets::{Authorizer, ResultPublisher, TableAppender, TableTarget};
use tracing::{error, info};

use crate::archive;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Runs one full session and returns its result once published.
///
/// Everything that can be checked without the user is checked before the
/// first task is shown.
pub async fn run(
    config: &ClientConfig,
    prompter: &mut dyn Prompter,
) -> ClientResult<SessionResult> {
    config.validate().map_err(ClientError::Config)?;
    let target = config.table_target().map_err(ClientError::Config)?;
    let google = config.to_google_config().map_err(ClientError::Config)?;

    let store = FileTokenStore::new(&google.token_path);
    let oauth = OAuthClient::new(&google)?;
    let authorizer = Authorizer::new(&store, &oauth).with_open_browser(google.open_browser);

    let credential = authorizer.authorize(prompter).await?;

    let mut source = RandomTaskSource::new();
    let result = SessionRunner::new(config.session.size)
        .run(&mut source, prompter)
        .await?;

    // From here on a failure must not lose the finished session.
    let archive_dir = config.archive_path();
    let refreshed = authorizer.ensure_fresh(credential).await;
    let credential = archive_on_err(&archive_dir, &result, refreshed)?;
    let client = archive_on_err(
        &archive_dir,
        &result,
        SheetsClient::new(&credential, google.timeout),
    )?;

    publish_or_archive(&client, &target, &result, &archive_dir).await?;
    Ok(result)
}

/// Publishes `result`, keeping a local copy if that fails.
pub async fn publish_or_archive(
    appender: &dyn TableAppender,
    target: &TableTarget,
    result: &SessionResult,
    archive_dir: &Path,
) -> ClientResult<()> {
    let published = ResultPublisher::new(appender).publish(target, result).await;
    archive_on_err(archive_dir, result, published)?;
    info!(spreadsheet_id = %target.spreadsheet_id, "session published");
    Ok(())
}

/// Passes `outcome` through, keeping a local copy of `result` if it failed.
fn archive_on_err<T, E>(
    archive_dir: &Path,
    result: &SessionResult,
    outcome: Result<T, E>,
) -> ClientResult<T>
where
    E: Into<ClientError>,
{
    outcome.map_err(|e| {
        match archive::save_unpublished(archive_dir, result) {
            Ok(path) => eprintln!("Result kept at {}", path.display()),
            Err(archive_err) => error!("could not archive unpublished result: {}", archive_err),
        }
        e.into()
    })
}
