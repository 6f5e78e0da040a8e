//! The handle to the Supabase project.
//!
//! A [BackendConnection] is either fully usable or never constructed: missing
//! or malformed endpoint/key values fail construction, and the CLI aborts
//! startup on that failure.

use chrono::{Duration, Utc};
use log::{debug, info};
use once_cell::sync::OnceCell;
use reqwest::{header, Method, RequestBuilder, Url};
use tokio::sync::RwLock;

use super::auth::{self, Session};
use crate::app_config::AppConfig;
use crate::backend::error::{ApiError, Operation, SubmissionError};

/// Sessions expiring within this window are refreshed before use.
const REFRESH_MARGIN_SECS: i64 = 60;

static CONNECTION: OnceCell<BackendConnection> = OnceCell::new();

/// Client behaviour that is fixed for the lifetime of a connection.
#[derive(Clone, Debug)]
pub struct ConnectionOptions {
    /// Refresh a signed-in session's access token shortly before it expires.
    pub auto_refresh_token: bool,
    /// Postgres schema the REST requests are made against.
    pub schema: String,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            auto_refresh_token: true,
            schema: "public".to_owned(),
        }
    }
}

/// Configured HTTP client for one Supabase project.
///
/// Sessions from [BackendConnection::sign_in_with_password] live in memory
/// only and are gone when the process exits.
pub struct BackendConnection {
    base_url: Url,
    anon_key: String,
    client: reqwest::Client,
    options: ConnectionOptions,
    session: RwLock<Option<Session>>,
}

impl BackendConnection {
    /// Builds a connection with default [ConnectionOptions].
    ///
    /// # Errors
    ///
    /// See [BackendConnection::new_with_options].
    pub fn new(endpoint: &str, anon_key: &str) -> Result<Self, SubmissionError> {
        Self::new_with_options(endpoint, anon_key, ConnectionOptions::default())
    }

    /// Configure HTTP client with key, user-agent, and headers.
    ///
    /// The endpoint is trimmed. The key is trimmed and has any quote characters
    /// removed, since keys pasted into `.env` files often keep their quotes.
    ///
    /// # Errors
    ///
    /// Returns [SubmissionError::ConfigurationMissing] if either value is
    /// empty, and [SubmissionError::ConfigurationInvalid] if the endpoint is not
    /// a URL or the key cannot be sent as a header.
    pub fn new_with_options(
        endpoint: &str,
        anon_key: &str,
        options: ConnectionOptions,
    ) -> Result<Self, SubmissionError> {
        let endpoint = endpoint.trim();
        let anon_key: String = anon_key
            .trim()
            .chars()
            .filter(|c| *c != '"' && *c != '\'')
            .collect::<String>()
            .trim()
            .to_owned();
        if endpoint.is_empty() {
            return Err(SubmissionError::ConfigurationMissing("url".to_owned()));
        }
        if anon_key.is_empty() {
            return Err(SubmissionError::ConfigurationMissing("anon_key".to_owned()));
        }
        let base_url = Url::parse(endpoint).map_err(|e| {
            SubmissionError::ConfigurationInvalid(format!("url {:?} ({})", endpoint, e))
        })?;

        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let invalid_header =
            |e: header::InvalidHeaderValue| SubmissionError::ConfigurationInvalid(e.to_string());
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "apikey",
            header::HeaderValue::from_str(&anon_key).map_err(invalid_header)?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        // Writes don't echo the written rows back
        headers.insert("Prefer", header::HeaderValue::from_static("return=minimal"));
        let schema = header::HeaderValue::from_str(&options.schema).map_err(invalid_header)?;
        headers.insert("Accept-Profile", schema.clone());
        headers.insert("Content-Profile", schema);

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| SubmissionError::ConfigurationInvalid(e.to_string()))?;

        debug!("configured connection to {}", base_url);
        Ok(Self {
            base_url,
            anon_key,
            client,
            options,
            session: RwLock::new(None),
        })
    }

    /// Builds a connection from loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, SubmissionError> {
        Self::new(&config.url, &config.anon_key)
    }

    /// Stores the process-wide connection. Only the first call succeeds.
    ///
    /// # Errors
    ///
    /// Returns [SubmissionError::AlreadyInitialized] on any later call.
    pub fn install(connection: BackendConnection) -> Result<&'static Self, SubmissionError> {
        let mut installed = false;
        let global = CONNECTION.get_or_init(|| {
            installed = true;
            connection
        });
        if installed {
            Ok(global)
        } else {
            Err(SubmissionError::AlreadyInitialized)
        }
    }

    /// The connection stored by [BackendConnection::install], if any.
    pub fn global() -> Option<&'static Self> {
        CONNECTION.get()
    }

    /// Signs in with email and password and keeps the session for later
    /// requests.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), SubmissionError> {
        let session = auth::password_grant(self, email, password)
            .await
            .map_err(|e| Operation::SignIn.translate(e))?;
        info!("signed in as {}", email);
        *self.session.write().await = Some(session);
        Ok(())
    }

    /// Drops the in-memory session; later requests use the anon key.
    pub async fn sign_out(&self) {
        *self.session.write().await = None;
    }

    #[cfg(test)]
    pub(crate) async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub(crate) fn rest_url(&self, table: &str) -> Url {
        self.endpoint_url(&format!("rest/v1/{}", table))
    }

    pub(crate) fn auth_url(&self, endpoint: &str) -> Url {
        self.endpoint_url(&format!("auth/v1/{}", endpoint))
    }

    /// Appends `path` to the configured endpoint's own path, so a project
    /// served under a prefix (e.g. behind a proxy) keeps it.
    fn endpoint_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}/{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url
    }

    /// Starts a request authorized as the signed-in user, or with the anon key
    /// when nobody is signed in.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: Url,
    ) -> Result<RequestBuilder, ApiError> {
        let token = self.bearer_token().await?;
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn bearer_token(&self) -> Result<String, ApiError> {
        let current = self.session.read().await.clone();
        match current {
            None => Ok(self.anon_key.clone()),
            Some(session)
                if self.options.auto_refresh_token
                    && session.expires_within(Duration::seconds(REFRESH_MARGIN_SECS), Utc::now()) =>
            {
                debug!("session expires at {}, refreshing", session.expires_at);
                let refreshed = auth::refresh_grant(self, &session.refresh_token).await?;
                let token = refreshed.access_token.clone();
                *self.session.write().await = Some(refreshed);
                Ok(token)
            }
            Some(session) => Ok(session.access_token),
        }
    }
}
