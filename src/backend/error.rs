// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

//! Failure types for talking to Supabase.
//!
//! [ApiError] is what the raw REST/auth calls return. Callers of the
//! [Gateway](super::gateway::Gateway) never see it: every public operation
//! translates it into a [SubmissionError], whose `Display` is the message a
//! user should read.

use log::error;
use reqwest::StatusCode;
use serde::Deserialize;
use strum_macros::Display;
use thiserror::Error;

/// Postgres `insufficient_privilege`, returned when row-level security denies
/// the request.
pub const PERMISSION_DENIED: &str = "42501";
/// Postgres `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

/// The one error type handed to callers of the submission operations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SubmissionError {
    #[error("Missing Supabase configuration: {0}")]
    ConfigurationMissing(String),
    #[error("Invalid Supabase configuration: {0}")]
    ConfigurationInvalid(String),
    #[error("Backend connection is already initialized")]
    AlreadyInitialized,
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    DuplicateSubmission(String),
    #[error("{0}")]
    Remote(String),
}

/// Errors from the REST and auth endpoints before translation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to Supabase failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Supabase returned {status} (code: {code:?}): {message:?}")]
    Response {
        status: StatusCode,
        code: Option<String>,
        message: Option<String>,
    },
    #[error("JSON from Supabase was malformed: {content}")]
    Malformed {
        content: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Error body returned by PostgREST, e.g.
/// `{"code":"42501","details":null,"hint":null,"message":"..."}`.
#[derive(Debug, Default, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Error body returned by GoTrue. Older versions use `error` and
/// `error_description`, newer ones `error_code` and `msg`.
#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorBody {
    error: Option<String>,
    error_code: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Builds a response error from a PostgREST error body. Bodies that are
    /// not JSON (e.g. an HTML page from a proxy) leave code and message empty.
    pub(crate) fn from_postgrest(status: StatusCode, content: &str) -> Self {
        let body: PostgrestErrorBody = serde_json::from_str(content).unwrap_or_default();
        ApiError::Response {
            status,
            code: body.code,
            message: body.message,
        }
    }

    pub(crate) fn from_gotrue(status: StatusCode, content: &str) -> Self {
        let body: GoTrueErrorBody = serde_json::from_str(content).unwrap_or_default();
        ApiError::Response {
            status,
            code: body.error_code.or(body.error),
            message: body.error_description.or(body.msg).or(body.message),
        }
    }
}

/// The user-facing operation an [ApiError] happened during. Determines which
/// message the error is translated to.
#[derive(Clone, Copy, Debug, Display, PartialEq)]
pub(crate) enum Operation {
    #[strum(serialize = "saving form data")]
    Save,
    #[strum(serialize = "retrieving form submissions")]
    Fetch,
    #[strum(serialize = "signing in")]
    SignIn,
}

impl Operation {
    fn permission_denied(self) -> &'static str {
        match self {
            Operation::Save => "Permission denied. Please try again later.",
            Operation::Fetch => "Permission denied. Please sign in to view submissions.",
            Operation::SignIn => "Permission denied.",
        }
    }

    /// Used when the backend answered with an error but no message.
    fn response_fallback(self) -> &'static str {
        match self {
            Operation::Save => "Failed to save form data",
            Operation::Fetch => "Failed to retrieve submissions",
            Operation::SignIn => "Failed to sign in",
        }
    }

    /// Used when there was no usable answer at all.
    fn transport_fallback(self) -> &'static str {
        match self {
            Operation::Save => "Failed to save form data. Please try again.",
            Operation::Fetch => "Failed to retrieve form submissions",
            Operation::SignIn => "Failed to sign in. Please try again.",
        }
    }

    /// Logs the original error and maps it to the message for this operation.
    pub(crate) fn translate(self, err: ApiError) -> SubmissionError {
        error!("Error {}: {}", self, err);
        match err {
            ApiError::Response {
                code: Some(code), ..
            } if code == PERMISSION_DENIED => {
                SubmissionError::PermissionDenied(self.permission_denied().to_owned())
            }
            ApiError::Response {
                code: Some(code), ..
            } if code == UNIQUE_VIOLATION && self == Operation::Save => {
                SubmissionError::DuplicateSubmission("This submission already exists.".to_owned())
            }
            ApiError::Response {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => SubmissionError::Remote(message),
            ApiError::Response { .. } => {
                SubmissionError::Remote(self.response_fallback().to_owned())
            }
            ApiError::Transport(_) | ApiError::Malformed { .. } => {
                SubmissionError::Remote(self.transport_fallback().to_owned())
            }
        }
    }
}
