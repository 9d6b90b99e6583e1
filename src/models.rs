//! Data models for the CommandK SDK
//!
//! * [`RenderedAppSecret`] - one rendered secret as returned by the host
//! * [`ValueType`] - how the serialized value should be interpreted
//! * [`RenderingMode`] - how the host materializes values
//! * [`GetRenderedSecretsOpts`] - per-call options

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// A secret rendered for one app in one environment
///
/// The value stays wrapped in a [`SecretString`] so it never leaks through
/// `Debug` output. The SDK passes these through untouched.
///
/// # Example
///
/// ```no_run
/// # use commandk_sdk::{Client, GetRenderedSecretsOpts};
/// # use secrecy::ExposeSecret;
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let secrets = client
///     .get_rendered_app_secrets("app-id", "env-id", GetRenderedSecretsOpts::default())
///     .await?;
/// for secret in &secrets {
///     println!("{} ({:?}) = {}", secret.key, secret.value_type, secret.serialized_value.expose_secret());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedAppSecret {
    /// Name the secret is exposed under
    pub key: String,
    /// Identifier of the secret in CommandK
    pub secret_id: String,
    /// Value as rendered by the host (protected)
    pub serialized_value: SecretString,
    /// Type of the serialized value
    pub value_type: ValueType,
}

impl RenderedAppSecret {
    /// Create a rendered secret, mainly useful for tests and custom transports
    pub fn new(
        key: impl Into<String>,
        secret_id: impl Into<String>,
        serialized_value: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        Self {
            key: key.into(),
            secret_id: secret_id.into(),
            serialized_value: SecretString::new(serialized_value.into()),
            value_type,
        }
    }
}

impl PartialEq for RenderedAppSecret {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.secret_id == other.secret_id
            && self.value_type == other.value_type
            && self.serialized_value.expose_secret() == other.serialized_value.expose_secret()
    }
}

impl Eq for RenderedAppSecret {}

/// Type of a rendered secret's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    /// Plain string
    String,
    /// Numeric value
    Number,
    /// `true` / `false`
    Boolean,
    /// JSON document
    Json,
    /// A value type this SDK version does not know about
    #[serde(other)]
    Unknown,
}

/// How the host materializes secret values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingMode {
    /// Fully resolved values
    #[default]
    Full,
}

impl RenderingMode {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderingMode::Full => "FULL",
        }
    }
}

/// Options for [`Client::get_rendered_app_secrets`](crate::Client::get_rendered_app_secrets)
///
/// # Example
///
/// ```
/// use commandk_sdk::GetRenderedSecretsOpts;
///
/// // Everything
/// let opts = GetRenderedSecretsOpts::default();
///
/// // Only two secrets
/// let opts = GetRenderedSecretsOpts::default().secret_names(["DATABASE_URL", "API_KEY"]);
/// assert_eq!(opts.secret_names.as_ref().map(Vec::len), Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GetRenderedSecretsOpts {
    /// Restrict the result to these secret names
    ///
    /// The filter does not take part in the cache key: a filtered and an
    /// unfiltered call for the same app and environment share one cache entry.
    pub secret_names: Option<Vec<String>>,
}

impl GetRenderedSecretsOpts {
    /// Restrict the result to the given secret names
    pub fn secret_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secret_names = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Body of a successful rendered-secrets response
#[derive(Debug, Deserialize)]
pub(crate) struct RenderedAppSecretsResponse {
    #[serde(default)]
    pub secrets: Vec<RenderedAppSecret>,
}
