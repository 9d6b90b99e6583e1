//! Where credential providers read their inputs from
//!
//! A [`SettingsSource`] exposes two lookups: environment variables and
//! process-level settings. Process settings are a process-wide key/value
//! registry an application fills in at startup (for example from its own
//! command line), see [`set_process_setting`].
//!
//! ```
//! use commandk_sdk::settings::{self, SettingsSource, SystemSettings};
//!
//! settings::set_process_setting("commandk.host", "https://api.commandk.dev");
//! assert_eq!(
//!     SystemSettings.process_setting("commandk.host").as_deref(),
//!     Some("https://api.commandk.dev"),
//! );
//! # let _ = settings::clear_process_setting("commandk.host");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{OnceLock, PoisonError, RwLock};

/// Environment variable holding the CommandK host
pub const HOST_ENV_VAR: &str = "COMMANDK_HOST";
/// Environment variable holding the CommandK API token
pub const API_TOKEN_ENV_VAR: &str = "COMMANDK_API_TOKEN";
/// Environment variable holding a config file path
pub const CONFIG_FILE_ENV_VAR: &str = "COMMANDK_CONFIG_FILE";

/// Process setting holding the CommandK host
pub const HOST_SETTING: &str = "commandk.host";
/// Process setting holding the CommandK API token
pub const API_TOKEN_SETTING: &str = "commandk.apiToken";
/// Process setting holding a config file path
pub const CONFIG_FILE_SETTING: &str = "commandk.configFile";

/// Read access to environment variables and process settings
pub trait SettingsSource: Send + Sync + fmt::Debug {
    /// Look up an environment variable
    fn env_var(&self, name: &str) -> Option<String>;

    /// Look up a process-level setting
    fn process_setting(&self, name: &str) -> Option<String>;
}

static PROCESS_SETTINGS: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn process_settings() -> &'static RwLock<HashMap<String, String>> {
    PROCESS_SETTINGS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Set a process-level setting, returning the previous value
pub fn set_process_setting(name: impl Into<String>, value: impl Into<String>) -> Option<String> {
    process_settings()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.into(), value.into())
}

/// Remove a process-level setting, returning the previous value
pub fn clear_process_setting(name: &str) -> Option<String> {
    process_settings()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(name)
}

/// Read a process-level setting
pub fn process_setting(name: &str) -> Option<String> {
    process_settings()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

/// Reads the real process environment and the global process-settings registry
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSettings;

impl SettingsSource for SystemSettings {
    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn process_setting(&self, name: &str) -> Option<String> {
        process_setting(name)
    }
}

/// Fixed in-memory settings, useful for tests and for embedding the SDK
/// where the real environment should not be consulted
#[derive(Clone, Default)]
pub struct MapSettings {
    env: HashMap<String, String>,
    settings: HashMap<String, String>,
}

impl MapSettings {
    /// Create an empty settings source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment variable
    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.env.insert(name.into(), value.into());
        self
    }

    /// Add a process setting
    pub fn setting(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.settings.insert(name.into(), value.into());
        self
    }
}

impl fmt::Debug for MapSettings {
    // Values may be tokens; only names are shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapSettings")
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .field("settings", &self.settings.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SettingsSource for MapSettings {
    fn env_var(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn process_setting(&self, name: &str) -> Option<String> {
        self.settings.get(name).cloned()
    }
}
