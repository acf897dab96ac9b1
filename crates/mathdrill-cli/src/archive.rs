//! Local copies of results that could not be published.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mathdrill_core::SessionResult;
use tracing::info;

/// Writes `result` as `session-<begin>.json` under `dir` and returns the path.
///
/// The directory is created if needed. An existing file for the same start
/// time is overwritten.
pub fn save_unpublished(dir: &Path, result: &SessionResult) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let name = format!("session-{}.json", result.begin.format("%Y%m%dT%H%M%S%z"));
    let path = dir.join(name);

    let content = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
    fs::write(&path, content)?;

    info!("unpublished result saved to {:?}", path);
    Ok(path)
}
