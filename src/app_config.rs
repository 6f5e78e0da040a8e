// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Config file used when `--config` isn't given. Optional, since everything
/// can come from the environment.
pub const DEFAULT_CONFIG_FILE: &str = "~/.config/formdrop/formdrop.toml";

/// Prefix of environment overrides, e.g. `SUPABASE_URL`, `SUPABASE_ANON_KEY`.
/// Nested keys use a double underscore: `SUPABASE_AUTH__EMAIL`.
pub const ENV_PREFIX: &str = "SUPABASE";

/// Everything needed to reach the Supabase project.
///
/// Missing values deserialize as empty strings so they are reported by the
/// connection, which names the missing one.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    /// Credentials to sign in with before making requests. Without them,
    /// requests use the anon key and row-level security decides.
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AuthConfig {
    pub email: String,
    pub password: String,
}

impl AppConfig {
    /// Copy with secrets replaced, for the `config` subcommand.
    pub fn redacted(&self) -> AppConfig {
        AppConfig {
            url: self.url.clone(),
            anon_key: redact(&self.anon_key),
            auth: self.auth.as_ref().map(|auth| AuthConfig {
                email: auth.email.clone(),
                password: redact(&auth.password),
            }),
        }
    }
}

fn redact(secret: &str) -> String {
    if secret.trim().is_empty() {
        String::new()
    } else {
        "<redacted>".to_owned()
    }
}

/// Layers the config file (if any) and environment variables.
///
/// A config file given explicitly must exist; the default one may be absent.
pub fn load(config_file: Option<&str>) -> Result<config::Config> {
    let mut settings = config::Config::default();
    // Use cmdline arg config file if provided, otherwise fall back to the default ~/.config/... path
    if let Some(config_file) = config_file {
        settings.merge(config::File::with_name(config_file))?;
    } else {
        settings.merge(
            config::File::with_name(&shellexpand::tilde(DEFAULT_CONFIG_FILE)).required(false),
        )?;
    }

    // Override with environment variables, if present
    // (Note double underscore to reach into lower struct levels!)
    settings.merge(config::Environment::with_prefix(ENV_PREFIX).separator("__"))?;
    Ok(settings)
}
