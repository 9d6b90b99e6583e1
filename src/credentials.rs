//! Credential resolution for the CommandK SDK
//!
//! A client needs a host and an API token. They are resolved once, when the
//! client is built, by a [`CredentialsProvider`]. The SDK ships three
//! providers and a chain that tries them in order:
//!
//! 1. [`EnvironmentVariablesProvider`] - `COMMANDK_HOST` and `COMMANDK_API_TOKEN`
//! 2. [`ProcessSettingsProvider`] - `commandk.host` and `commandk.apiToken`
//! 3. [`ConfigFileProvider`] - a TOML file named by `COMMANDK_CONFIG_FILE` or
//!    the `commandk.configFile` setting
//!
//! A provider answers with one of three outcomes:
//!
//! - `Ok(Some(credentials))` - found, the chain stops here
//! - `Ok(None)` - nothing configured for this source, the chain moves on
//! - `Err(_)` - the source is configured but broken, the chain stops with the error
//!
//! # Example
//!
//! ```
//! use commandk_sdk::{CredentialsProvider, CredentialsProviderChain, EnvironmentVariablesProvider};
//! use commandk_sdk::settings::MapSettings;
//! use std::sync::Arc;
//!
//! let settings = Arc::new(
//!     MapSettings::new()
//!         .env("COMMANDK_HOST", "https://api.commandk.dev")
//!         .env("COMMANDK_API_TOKEN", "ck_token"),
//! );
//! let chain = CredentialsProviderChain::new(vec![
//!     Box::new(EnvironmentVariablesProvider::with_settings(settings)),
//! ]);
//! let credentials = chain.resolve().unwrap();
//! assert_eq!(credentials.host(), "https://api.commandk.dev");
//! ```

use crate::{
    config_file::ConfigFileProvider,
    errors::{Error, Result},
    settings::{
        SettingsSource, SystemSettings, API_TOKEN_ENV_VAR, API_TOKEN_SETTING, HOST_ENV_VAR,
        HOST_SETTING,
    },
};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Host and API token used to talk to CommandK
///
/// The token is held in a [`SecretString`] and never shows up in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    host: String,
    api_token: SecretString,
}

impl Credentials {
    /// Create credentials from a host and a token
    pub fn new(host: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_token: SecretString::new(api_token.into()),
        }
    }

    /// The CommandK host, e.g. `https://api.commandk.dev`
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The API token
    pub fn api_token(&self) -> &SecretString {
        &self.api_token
    }

    /// Both fields must be non-empty before a client may use them
    pub(crate) fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() || self.api_token.expose_secret().trim().is_empty() {
            return Err(Error::Config(
                "Provided credentials are missing host or apiToken".to_string(),
            ));
        }
        Ok(())
    }

    /// `Authorization` header name and value
    pub(crate) fn authorization_header(&self) -> (&'static str, String) {
        (
            "Authorization",
            format!("Bearer {}", self.api_token.expose_secret()),
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("api_token", &"****")
            .finish()
    }
}

/// A single source of [`Credentials`]
pub trait CredentialsProvider: Send + Sync + fmt::Debug {
    /// Resolve credentials from this source
    ///
    /// Returns `Ok(None)` when the source has nothing configured. Returns an
    /// error only when the source is configured but unusable.
    fn resolve_credentials(&self) -> Result<Option<Credentials>>;
}

impl<P: CredentialsProvider + ?Sized> CredentialsProvider for Arc<P> {
    fn resolve_credentials(&self) -> Result<Option<Credentials>> {
        (**self).resolve_credentials()
    }
}

impl<P: CredentialsProvider + ?Sized> CredentialsProvider for Box<P> {
    fn resolve_credentials(&self) -> Result<Option<Credentials>> {
        (**self).resolve_credentials()
    }
}

/// Treats unset and blank values alike
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reads `COMMANDK_HOST` and `COMMANDK_API_TOKEN`
#[derive(Debug, Clone)]
pub struct EnvironmentVariablesProvider {
    settings: Arc<dyn SettingsSource>,
}

impl EnvironmentVariablesProvider {
    /// Read from the process environment
    pub fn new() -> Self {
        Self::with_settings(Arc::new(SystemSettings))
    }

    /// Read from the given settings source
    pub fn with_settings(settings: Arc<dyn SettingsSource>) -> Self {
        Self { settings }
    }
}

impl Default for EnvironmentVariablesProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialsProvider for EnvironmentVariablesProvider {
    fn resolve_credentials(&self) -> Result<Option<Credentials>> {
        let host = non_empty(self.settings.env_var(HOST_ENV_VAR));
        let token = non_empty(self.settings.env_var(API_TOKEN_ENV_VAR));

        match (host, token) {
            (Some(host), Some(token)) => Ok(Some(Credentials::new(host, token))),
            _ => Ok(None),
        }
    }
}

/// Reads the `commandk.host` and `commandk.apiToken` process settings
#[derive(Debug, Clone)]
pub struct ProcessSettingsProvider {
    settings: Arc<dyn SettingsSource>,
}

impl ProcessSettingsProvider {
    /// Read from the global process-settings registry
    pub fn new() -> Self {
        Self::with_settings(Arc::new(SystemSettings))
    }

    /// Read from the given settings source
    pub fn with_settings(settings: Arc<dyn SettingsSource>) -> Self {
        Self { settings }
    }
}

impl Default for ProcessSettingsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialsProvider for ProcessSettingsProvider {
    fn resolve_credentials(&self) -> Result<Option<Credentials>> {
        let host = non_empty(self.settings.process_setting(HOST_SETTING));
        let token = non_empty(self.settings.process_setting(API_TOKEN_SETTING));

        match (host, token) {
            (Some(host), Some(token)) => Ok(Some(Credentials::new(host, token))),
            _ => Ok(None),
        }
    }
}

/// Ordered list of providers; the first one that yields credentials wins
///
/// Results are never merged: a host from one source is not combined with a
/// token from another.
#[derive(Debug)]
pub struct CredentialsProviderChain {
    providers: Vec<Box<dyn CredentialsProvider>>,
}

impl CredentialsProviderChain {
    /// Build a chain from providers in precedence order
    pub fn new(providers: Vec<Box<dyn CredentialsProvider>>) -> Self {
        Self { providers }
    }

    /// Environment variables, then process settings, then config file, all
    /// reading from `settings`
    pub fn with_settings(settings: Arc<dyn SettingsSource>) -> Self {
        Self::new(vec![
            Box::new(EnvironmentVariablesProvider::with_settings(settings.clone())),
            Box::new(ProcessSettingsProvider::with_settings(settings.clone())),
            Box::new(ConfigFileProvider::with_settings(settings)),
        ])
    }

    /// Resolve credentials, failing if no provider has any
    pub fn resolve(&self) -> Result<Credentials> {
        for (position, provider) in self.providers.iter().enumerate() {
            if let Some(credentials) = provider.resolve_credentials()? {
                debug!(position, "resolved credentials");
                return Ok(credentials);
            }
        }
        Err(Error::Config("No valid credentials were found".to_string()))
    }
}

impl Default for CredentialsProviderChain {
    fn default() -> Self {
        Self::with_settings(Arc::new(SystemSettings))
    }
}

impl CredentialsProvider for CredentialsProviderChain {
    fn resolve_credentials(&self) -> Result<Option<Credentials>> {
        self.resolve().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MapSettings;

    #[derive(Debug)]
    struct Failing;

    impl CredentialsProvider for Failing {
        fn resolve_credentials(&self) -> Result<Option<Credentials>> {
            Err(Error::Config("broken source".to_string()))
        }
    }

    #[derive(Debug)]
    struct Fixed(&'static str);

    impl CredentialsProvider for Fixed {
        fn resolve_credentials(&self) -> Result<Option<Credentials>> {
            Ok(Some(Credentials::new(self.0, "token")))
        }
    }

    fn settings(map: MapSettings) -> Arc<dyn SettingsSource> {
        Arc::new(map)
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let credentials = Credentials::new("https://api.commandk.dev", "super-secret");
        let debug_str = format!("{:?}", credentials);
        assert!(debug_str.contains("https://api.commandk.dev"));
        assert!(!debug_str.contains("super-secret"));
    }

    #[test]
    fn test_authorization_header() {
        let credentials = Credentials::new("https://api.commandk.dev", "token123");
        let (header, value) = credentials.authorization_header();
        assert_eq!(header, "Authorization");
        assert_eq!(value, "Bearer token123");
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert!(Credentials::new("https://h", "t").validate().is_ok());
        assert!(matches!(
            Credentials::new("", "t").validate(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Credentials::new("https://h", " ").validate(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_env_provider_requires_both_values() {
        let provider = EnvironmentVariablesProvider::with_settings(settings(
            MapSettings::new().env(HOST_ENV_VAR, "https://env.example.com"),
        ));
        assert!(provider.resolve_credentials().unwrap().is_none());

        let provider = EnvironmentVariablesProvider::with_settings(settings(
            MapSettings::new()
                .env(HOST_ENV_VAR, "https://env.example.com")
                .env(API_TOKEN_ENV_VAR, ""),
        ));
        assert!(provider.resolve_credentials().unwrap().is_none());

        let provider = EnvironmentVariablesProvider::with_settings(settings(
            MapSettings::new()
                .env(HOST_ENV_VAR, "https://env.example.com")
                .env(API_TOKEN_ENV_VAR, "env-token"),
        ));
        let credentials = provider.resolve_credentials().unwrap().unwrap();
        assert_eq!(credentials.host(), "https://env.example.com");
        assert_eq!(credentials.api_token().expose_secret(), "env-token");
    }

    #[test]
    fn test_settings_provider_ignores_env() {
        let provider = ProcessSettingsProvider::with_settings(settings(
            MapSettings::new()
                .env(HOST_ENV_VAR, "https://env.example.com")
                .env(API_TOKEN_ENV_VAR, "env-token"),
        ));
        assert!(provider.resolve_credentials().unwrap().is_none());

        let provider = ProcessSettingsProvider::with_settings(settings(
            MapSettings::new()
                .setting(HOST_SETTING, "https://prop.example.com")
                .setting(API_TOKEN_SETTING, "prop-token"),
        ));
        let credentials = provider.resolve_credentials().unwrap().unwrap();
        assert_eq!(credentials.host(), "https://prop.example.com");
    }

    #[test]
    fn test_chain_env_wins_over_settings() {
        let chain = CredentialsProviderChain::with_settings(settings(
            MapSettings::new()
                .env(HOST_ENV_VAR, "https://env.example.com")
                .env(API_TOKEN_ENV_VAR, "env-token")
                .setting(HOST_SETTING, "https://prop.example.com")
                .setting(API_TOKEN_SETTING, "prop-token"),
        ));
        let credentials = chain.resolve().unwrap();
        assert_eq!(credentials.host(), "https://env.example.com");
        assert_eq!(credentials.api_token().expose_secret(), "env-token");
    }

    #[test]
    fn test_chain_discards_partial_env() {
        let chain = CredentialsProviderChain::with_settings(settings(
            MapSettings::new()
                .env(HOST_ENV_VAR, "https://env.example.com")
                .setting(HOST_SETTING, "https://prop.example.com")
                .setting(API_TOKEN_SETTING, "prop-token"),
        ));
        let credentials = chain.resolve().unwrap();
        assert_eq!(credentials.host(), "https://prop.example.com");
        assert_eq!(credentials.api_token().expose_secret(), "prop-token");
    }

    #[test]
    fn test_chain_with_nothing_configured() {
        let chain = CredentialsProviderChain::with_settings(settings(MapSettings::new()));
        let err = chain.resolve().unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg == "No valid credentials were found"));
    }

    #[test]
    fn test_chain_stops_on_fatal_provider() {
        let chain = CredentialsProviderChain::new(vec![Box::new(Failing), Box::new(Fixed("h"))]);
        let err = chain.resolve().unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg == "broken source"));
    }

    #[test]
    fn test_chain_first_match_wins() {
        let chain = CredentialsProviderChain::new(vec![
            Box::new(Fixed("first")),
            Box::new(Failing),
            Box::new(Fixed("second")),
        ]);
        assert_eq!(chain.resolve().unwrap().host(), "first");
        assert_eq!(
            chain.resolve_credentials().unwrap().unwrap().host(),
            "first"
        );
    }
}
