//! Credentials from a config file
//!
//! The file is TOML with two keys:
//!
//! ```toml
//! host = "https://api.commandk.dev"
//! apiToken = "ck_..."
//! ```
//!
//! `api_token` is accepted in place of `apiToken`. Other keys are ignored.

use crate::{
    credentials::{non_empty, Credentials, CredentialsProvider},
    errors::{Error, Result},
    settings::{SettingsSource, SystemSettings, CONFIG_FILE_ENV_VAR, CONFIG_FILE_SETTING},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use zeroize::Zeroize;

#[derive(Deserialize)]
struct ConfigFileCredentials {
    host: Option<String>,
    #[serde(rename = "apiToken", alias = "api_token")]
    api_token: Option<String>,
}

/// Read credentials from the TOML file at `path`
///
/// Any failure is a configuration error: the caller asked for this file
/// explicitly, so an unreadable or incomplete file is not "absent".
pub fn read_credentials_file(path: impl AsRef<Path>) -> Result<Credentials> {
    let path = path.as_ref();
    let mut raw = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Cannot read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let parsed = toml::from_str::<ConfigFileCredentials>(&raw);
    raw.zeroize();

    let parsed = parsed.map_err(|e| {
        Error::Config(format!(
            "Malformed config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    match (parsed.host, parsed.api_token) {
        (Some(host), Some(mut token)) if !host.trim().is_empty() && !token.trim().is_empty() => {
            let credentials = Credentials::new(host, token.as_str());
            token.zeroize();
            Ok(credentials)
        }
        _ => Err(Error::Config(format!(
            "Missing configuration values in '{}'",
            path.display()
        ))),
    }
}

/// Reads credentials from the file named by `COMMANDK_CONFIG_FILE`, or failing
/// that by the `commandk.configFile` process setting
#[derive(Debug, Clone)]
pub struct ConfigFileProvider {
    settings: Arc<dyn SettingsSource>,
}

impl ConfigFileProvider {
    /// Locate the file through the process environment and settings registry
    pub fn new() -> Self {
        Self::with_settings(Arc::new(SystemSettings))
    }

    /// Locate the file through the given settings source
    pub fn with_settings(settings: Arc<dyn SettingsSource>) -> Self {
        Self { settings }
    }

    /// The configured file path, if any
    pub fn config_path(&self) -> Option<PathBuf> {
        non_empty(self.settings.env_var(CONFIG_FILE_ENV_VAR))
            .or_else(|| non_empty(self.settings.process_setting(CONFIG_FILE_SETTING)))
            .map(PathBuf::from)
    }
}

impl Default for ConfigFileProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialsProvider for ConfigFileProvider {
    fn resolve_credentials(&self) -> Result<Option<Credentials>> {
        let Some(path) = self.config_path() else {
            return Ok(None);
        };
        debug!(path = %path.display(), "reading credentials from config file");
        read_credentials_file(&path).map(Some)
    }
}
