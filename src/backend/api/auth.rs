//! Password sign-in and token refresh against the project's auth endpoint.

use chrono::{DateTime, Duration, TimeZone, Utc};
use log::debug;
use serde::Deserialize;
use serde_json::json;

use super::connection::BackendConnection;
use crate::backend::error::ApiError;

/// Lifetime assumed when the auth server doesn't say.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// A signed-in user's tokens.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn expires_within(&self, margin: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at - margin <= now
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    /// Unix seconds
    expires_at: Option<i64>,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_else(|| {
                now + Duration::seconds(self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS))
            });
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

pub(crate) async fn password_grant(
    connection: &BackendConnection,
    email: &str,
    password: &str,
) -> Result<Session, ApiError> {
    debug!("building password grant request for: {}", email);
    token_grant(
        connection,
        "password",
        json!({"email": email, "password": password}),
    )
    .await
}

pub(crate) async fn refresh_grant(
    connection: &BackendConnection,
    refresh_token: &str,
) -> Result<Session, ApiError> {
    debug!("building refresh token grant request");
    token_grant(
        connection,
        "refresh_token",
        json!({ "refresh_token": refresh_token }),
    )
    .await
}

async fn token_grant(
    connection: &BackendConnection,
    grant_type: &str,
    body: serde_json::Value,
) -> Result<Session, ApiError> {
    let mut url = connection.auth_url("token");
    url.query_pairs_mut().append_pair("grant_type", grant_type);

    // The token endpoint is always called with the anon key, never the
    // (possibly expired) session token.
    let response = connection
        .client()
        .post(url)
        .bearer_auth(connection.anon_key())
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    debug!("status: {}", status);
    let content = response.text().await?;
    if !status.is_success() {
        debug!("content: {}", content);
        return Err(ApiError::from_gotrue(status, &content));
    }

    let token: TokenResponse =
        serde_json::from_str(&content).map_err(|source| ApiError::Malformed {
            content: content.clone(),
            source,
        })?;
    Ok(token.into_session(Utc::now()))
}
