//! Save, fetch, and export contact-form submissions.
//!
//! Each operation is a single request to Supabase. Failures are logged and
//! translated into a [SubmissionError] carrying a user-readable message; the
//! raw transport error never reaches the caller.

use std::path::Path;

use chrono::Utc;
use log::{error, info};

use super::api::connection::BackendConnection;
use super::api::submissions;
use super::error::{Operation, SubmissionError};
use super::export::{self, ExportError, ExportOutcome, NOTHING_TO_EXPORT};
use super::models::{Submission, SubmissionInput};
use super::notify::Notifier;

/// Submission operations on top of a [BackendConnection].
#[derive(Clone, Copy)]
pub struct Gateway<'a> {
    connection: &'a BackendConnection,
}

impl<'a> Gateway<'a> {
    pub fn new(connection: &'a BackendConnection) -> Self {
        Self { connection }
    }

    /// A gateway over the process-wide connection.
    ///
    /// # Errors
    ///
    /// Returns [SubmissionError::ConfigurationMissing] if no connection was
    /// installed with [BackendConnection::install].
    pub fn global() -> Result<Gateway<'static>, SubmissionError> {
        BackendConnection::global()
            .map(|connection| Gateway { connection })
            .ok_or_else(|| SubmissionError::ConfigurationMissing("connection".to_owned()))
    }

    /// Validates and saves one submission.
    ///
    /// Returns the row as it was sent, so `created_at` is the client's clock,
    /// not the server's.
    ///
    /// # Errors
    ///
    /// Invalid input fails before any request is made. Permission and
    /// uniqueness failures get fixed messages; other failures carry the
    /// server's message or a generic one.
    pub async fn save(&self, input: SubmissionInput) -> Result<Submission, SubmissionError> {
        let submission = input.validate(Utc::now()).map_err(|e| {
            error!("Error saving form data: {}", e);
            e
        })?;

        submissions::submissions_post(self.connection, std::slice::from_ref(&submission))
            .await
            .map_err(|e| Operation::Save.translate(e))?;

        info!("saved submission from {}", submission.email);
        Ok(submission)
    }

    /// Every stored submission, newest first. Never fails on an empty table.
    ///
    /// # Errors
    ///
    /// Permission failures ask the user to sign in; other failures carry the
    /// server's message or a generic one.
    pub async fn fetch_all(&self) -> Result<Vec<Submission>, SubmissionError> {
        let mut submissions = submissions::submissions_get(self.connection)
            .await
            .map_err(|e| Operation::Fetch.translate(e))?;

        // Stable, so the server's order breaks ties
        submissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        info!("retrieved {} submission(s)", submissions.len());
        Ok(submissions)
    }

    /// Exports every submission to `dir/form_submissions_<today>.json`.
    ///
    /// Never fails: an empty table and any failure are reported through
    /// `notifier`, and the outcome says which happened.
    pub async fn export_all(&self, dir: &Path, notifier: &dyn Notifier) -> ExportOutcome {
        match self.try_export(dir).await {
            Ok(Some(path)) => {
                info!("exported submissions to {}", path.display());
                ExportOutcome::Saved(path)
            }
            Ok(None) => {
                notifier.alert(NOTHING_TO_EXPORT);
                ExportOutcome::Empty
            }
            Err(e) => {
                error!("Error exporting submissions: {:?}", e);
                let message = e.to_string();
                notifier.alert(&message);
                ExportOutcome::Failed(message)
            }
        }
    }

    async fn try_export(&self, dir: &Path) -> Result<Option<std::path::PathBuf>, ExportError> {
        let submissions = self.fetch_all().await?;
        if submissions.is_empty() {
            return Ok(None);
        }

        let contents = export::render(&submissions)?;
        let filename = export::export_filename(Utc::now().date_naive());
        let path = export::save_export(dir, &filename, contents.as_bytes()).await?;
        Ok(Some(path))
    }
}
