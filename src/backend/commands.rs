// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::models::{Submission, SubmissionInput};
use crate::app_config::AppConfig;

/// Reads a submission from a JSON file, e.g. one exported by a web form.
pub fn read_submission_input(path: &Path) -> Result<SubmissionInput> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Couldn't read submission file {}", path.display()))?;
    let input = serde_json::from_str(&content)
        .with_context(|| format!("Submission file {} is not valid JSON", path.display()))?;
    Ok(input)
}

/// One line of `ls` output.
pub fn format_submission_row(submission: &Submission) -> String {
    format!(
        "{}  {}  {}  {}  {}",
        submission.created_at.to_rfc3339(),
        submission.name,
        submission.company,
        submission.email,
        submission.project_type
    )
}

/// Show the configuration, with secrets redacted
pub fn print_config(config: config::Config) -> Result<()> {
    let app_config: AppConfig = config.try_into()?;
    println!("{}", toml::to_string(&app_config.redacted())?);

    Ok(())
}
