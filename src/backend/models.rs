// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

//! Serialization to/from the `contact_submissions` table.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::SubmissionError;

/// One contact-form entry, as stored in `contact_submissions`.
///
/// Optional fields serialize as `null` rather than being omitted, so the insert
/// payload always names every column. Stored rows with a `null` or missing
/// text column load with an empty string there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Category picked on the form, stored as given.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub project_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub budget: Option<Budget>,
    #[serde(default)]
    pub timeline: Option<String>,
    /// How the submitter heard about us.
    #[serde(default)]
    pub source: Option<String>,
    /// Stamped by the client at save time.
    #[serde(with = "iso_8601")]
    pub created_at: DateTime<Utc>,
    /// Columns the store adds on its own (e.g. `id`), passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A budget is whatever the form sent: free text ("5-10k") or a number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Budget {
    Amount(serde_json::Number),
    Text(String),
}

impl Budget {
    fn is_blank(&self) -> bool {
        match self {
            Budget::Amount(n) => n.as_f64() == Some(0.0),
            Budget::Text(t) => t.is_empty(),
        }
    }
}

/// A loosely structured form submission as a caller hands it over. Nothing is
/// guaranteed present until [SubmissionInput::validate] has run.
///
/// Accepts the form's camelCase names (`projectType`) and the table's
/// snake_case names.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInput {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "project_type")]
    pub project_type: Option<String>,
    pub description: Option<String>,
    pub budget: Option<Budget>,
    pub timeline: Option<String>,
    pub source: Option<String>,
}

impl SubmissionInput {
    /// Checks required fields and normalizes the input into a row stamped with
    /// `now` (truncated to milliseconds).
    ///
    /// Required text is trimmed, except the project type, which is taken as
    /// given. A phone number that is empty after trimming becomes `None`.
    /// Empty timeline, source and budget text become `None`, as does a zero
    /// budget; whitespace in those is kept as entered.
    ///
    /// # Errors
    ///
    /// Returns [SubmissionError::Invalid] for the first missing required field
    /// or an empty name.
    pub fn validate(self, now: DateTime<Utc>) -> Result<Submission, SubmissionError> {
        let name = required("name", self.name)?;
        if name.is_empty() {
            return Err(SubmissionError::Invalid("Name must not be empty".to_owned()));
        }
        let company = required("company", self.company)?;
        let email = required("email", self.email)?;
        let project_type = self
            .project_type
            .ok_or_else(|| missing_field("project_type"))?;
        let description = required("description", self.description)?;

        Ok(Submission {
            name,
            company,
            email,
            phone: optional(self.phone.map(|p| p.trim().to_owned())),
            project_type,
            description,
            budget: self.budget.filter(|b| !b.is_blank()),
            timeline: optional(self.timeline),
            source: optional(self.source),
            created_at: now.trunc_subsecs(3),
            extra: serde_json::Map::new(),
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, SubmissionError> {
    value
        .map(|v| v.trim().to_owned())
        .ok_or_else(|| missing_field(field))
}

fn missing_field(field: &str) -> SubmissionError {
    SubmissionError::Invalid(format!("Missing required field: {}", field))
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Handles (de)serializing `created_at`, as suggested at
/// <https://serde.rs/custom-date-format.html>.
///
/// Writes RFC 3339 in UTC with a `Z` suffix and at least millisecond
/// precision. Reads RFC 3339 with any offset, or a naive timestamp (from a
/// `timestamp without time zone` column) taken as UTC.
mod iso_8601 {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Timelike, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    // Example: 2021-05-06T23:54:45.626411
    const NOTZ_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let format = if date.nanosecond() % 1_000_000 == 0 {
            SecondsFormat::Millis
        } else {
            SecondsFormat::AutoSi
        };
        serializer.serialize_str(&date.to_rfc3339_opts(format, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if let Ok(date) = DateTime::parse_from_rfc3339(&s) {
            return Ok(date.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&s, NOTZ_FORMAT)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(serde::de::Error::custom)
    }
}
