//! Writing submissions out as a JSON file.

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, warn};
use thiserror::Error;

use super::error::SubmissionError;
use super::models::Submission;

pub const NOTHING_TO_EXPORT: &str = "No form submissions to export";

/// How an export ended. Failures have already been shown to the user.
#[derive(Clone, Debug, PartialEq)]
pub enum ExportOutcome {
    /// The file was written to this path.
    Saved(PathBuf),
    /// There were no submissions, so no file was written.
    Empty,
    /// Export failed with the message that was shown.
    Failed(String),
}

#[derive(Debug, Error)]
pub(crate) enum ExportError {
    #[error("{0}")]
    Fetch(#[from] SubmissionError),
    #[error("Failed to export submissions: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to export submissions: {0}")]
    Io(#[from] io::Error),
}

/// `form_submissions_YYYY-MM-DD.json`
pub fn export_filename(date: NaiveDate) -> String {
    format!("form_submissions_{}.json", date.format("%Y-%m-%d"))
}

/// Pretty-prints submissions as a JSON array with 2-space indentation.
pub fn render(submissions: &[Submission]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(submissions)
}

/// A file that is removed when dropped, whether or not it was renamed away.
struct PartialFile {
    path: PathBuf,
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("removed partial export {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("couldn't remove {}: {}", self.path.display(), e),
        }
    }
}

/// Writes `contents` to `dir/filename`, creating `dir` if needed.
///
/// The bytes go to a `.part` file first, which is renamed into place once
/// fully written. The `.part` file never outlives this call.
///
/// # Errors
///
/// Returns an error if the directory can't be created or either the write or
/// the rename fails.
pub async fn save_export(dir: &Path, filename: &str, contents: &[u8]) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(filename);
    let partial = PartialFile {
        path: dir.join(format!("{}.part", filename)),
    };

    debug!("writing {} bytes to {}", contents.len(), partial.path.display());
    tokio::fs::write(&partial.path, contents).await?;
    tokio::fs::rename(&partial.path, &path).await?;
    Ok(path)
}
