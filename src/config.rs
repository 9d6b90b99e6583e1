use crate::{
    api::SecretsApi,
    cache::StoreFactory,
    credentials::CredentialsProvider,
    errors::{Error, Result},
    telemetry::TelemetryConfig,
};
use std::sync::Arc;
use std::time::Duration;

/// Transport configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent suffix
    pub user_agent_suffix: Option<String>,
    /// Telemetry configuration
    pub telemetry_config: TelemetryConfig,
    /// Allow plain `http://` hosts
    pub allow_insecure_http: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(crate::DEFAULT_TIMEOUT_MS),
            user_agent_suffix: None,
            telemetry_config: TelemetryConfig::default(),
            allow_insecure_http: false,
        }
    }
}

/// Builder for creating a configured Client
///
/// A credentials provider and a store factory are both required.
///
/// ```no_run
/// use commandk_sdk::{ClientBuilder, CredentialsProviderChain, IsolatedStoreFactory};
///
/// # fn example() -> commandk_sdk::Result<()> {
/// let client = ClientBuilder::new()
///     .credentials_provider(CredentialsProviderChain::default())
///     .store_factory(IsolatedStoreFactory)
///     .timeout_ms(10_000)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ClientBuilder {
    credentials_provider: Option<Box<dyn CredentialsProvider>>,
    store_factory: Option<Box<dyn StoreFactory>>,
    secrets_api: Option<Arc<dyn SecretsApi>>,
    config: ClientConfig,
}

impl ClientBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set where the host and API token come from
    pub fn credentials_provider(mut self, provider: impl CredentialsProvider + 'static) -> Self {
        self.credentials_provider = Some(Box::new(provider));
        self
    }

    /// Set which response store the client binds to
    pub fn store_factory(mut self, factory: impl StoreFactory + 'static) -> Self {
        self.store_factory = Some(Box::new(factory));
        self
    }

    /// Replace the HTTP transport
    ///
    /// Credentials are still resolved and validated, but requests go through
    /// `api` instead of the built-in HTTPS client.
    pub fn secrets_api(mut self, api: Arc<dyn SecretsApi>) -> Self {
        self.secrets_api = Some(api);
        self
    }

    /// Set the request timeout in milliseconds
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout = Duration::from_millis(timeout_ms);
        self
    }

    /// Add a custom user agent suffix
    pub fn user_agent_extra(mut self, suffix: impl Into<String>) -> Self {
        self.config.user_agent_suffix = Some(suffix.into());
        self
    }

    /// Configure telemetry/metrics
    #[cfg(feature = "metrics")]
    pub fn with_telemetry(mut self, config: TelemetryConfig) -> Self {
        self.config.telemetry_config = config;
        self
    }

    /// Enable telemetry with default settings
    #[cfg(feature = "metrics")]
    pub fn enable_telemetry(mut self) -> Self {
        self.config.telemetry_config.enabled = true;
        self
    }

    /// Allow plain `http://` hosts (dangerous, for local testing only)
    pub fn danger_allow_insecure_http(mut self) -> Self {
        self.config.allow_insecure_http = true;
        self
    }

    /// Build the client with the configured options
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArgument`] if no credentials provider or store factory was set
    /// * [`Error::Config`] if credentials cannot be resolved or are incomplete,
    ///   the factory has no store, or the host is unusable
    pub fn build(self) -> Result<crate::Client> {
        let provider = self.credentials_provider.ok_or_else(|| {
            Error::InvalidArgument(
                "credentials provider is required. Use .credentials_provider()".to_string(),
            )
        })?;
        let factory = self.store_factory.ok_or_else(|| {
            Error::InvalidArgument("store factory is required. Use .store_factory()".to_string())
        })?;

        let credentials = provider.resolve_credentials()?.ok_or_else(|| {
            Error::Config("Provided credentials provider resolved no credentials".to_string())
        })?;
        credentials.validate()?;

        let store = factory
            .store()
            .ok_or_else(|| Error::Config("Store factory returned no store".to_string()))?;

        crate::client::Client::from_parts(credentials, store, self.secrets_api, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FetchOutcome, RenderedSecretsRequest};
    use crate::cache::{IsolatedStoreFactory, ResponseStore};
    use crate::credentials::Credentials;
    use crate::models::{GetRenderedSecretsOpts, RenderedAppSecret, ValueType};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Fixed(Option<Credentials>);

    impl CredentialsProvider for Fixed {
        fn resolve_credentials(&self) -> Result<Option<Credentials>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct NoStore;

    impl StoreFactory for NoStore {
        fn store(&self) -> Option<Arc<dyn ResponseStore>> {
            None
        }
    }

    /// Answers every request with one secret and counts calls
    #[derive(Debug, Default)]
    struct CountingApi {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SecretsApi for CountingApi {
        async fn get_rendered_app_secrets(
            &self,
            request: &RenderedSecretsRequest<'_>,
        ) -> Result<FetchOutcome> {
            let _ = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchOutcome::Fresh {
                secrets: vec![RenderedAppSecret::new(
                    "K",
                    request.environment_id,
                    "V",
                    ValueType::String,
                )],
                etag: None,
            })
        }
    }

    fn valid() -> Fixed {
        Fixed(Some(Credentials::new("https://api.commandk.dev", "token")))
    }

    #[test]
    fn test_builder_requires_both_dependencies() {
        let err = ClientBuilder::new().build().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = ClientBuilder::new()
            .store_factory(IsolatedStoreFactory)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = ClientBuilder::new()
            .credentials_provider(valid())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_builder_rejects_absent_credentials() {
        let err = ClientBuilder::new()
            .credentials_provider(Fixed(None))
            .store_factory(IsolatedStoreFactory)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder_rejects_incomplete_credentials() {
        let err = ClientBuilder::new()
            .credentials_provider(Fixed(Some(Credentials::new("https://h", ""))))
            .store_factory(IsolatedStoreFactory)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("missing host or apiToken")));
    }

    #[test]
    fn test_builder_rejects_missing_store() {
        let err = ClientBuilder::new()
            .credentials_provider(valid())
            .store_factory(NoStore)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("no store")));
    }

    #[test]
    fn test_builder_rejects_http_host() {
        let err = ClientBuilder::new()
            .credentials_provider(Fixed(Some(Credentials::new("http://h", "t"))))
            .store_factory(IsolatedStoreFactory)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder_success() {
        let client = ClientBuilder::new()
            .credentials_provider(valid())
            .store_factory(IsolatedStoreFactory)
            .timeout_ms(5_000)
            .user_agent_extra("tests")
            .build();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_builder_uses_injected_api() {
        let api = Arc::new(CountingApi::default());
        // A plain http host is fine: the built-in transport is never constructed.
        let client = ClientBuilder::new()
            .credentials_provider(Fixed(Some(Credentials::new("http://h", "t"))))
            .store_factory(IsolatedStoreFactory)
            .secrets_api(api.clone())
            .build()
            .unwrap();

        let secrets = client
            .get_rendered_app_secrets("app1", "env1", GetRenderedSecretsOpts::default())
            .await
            .unwrap();

        assert_eq!(secrets, vec![RenderedAppSecret::new("K", "env1", "V", ValueType::String)]);
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_injected_api_still_requires_credentials_and_store() {
        let api: Arc<dyn SecretsApi> = Arc::new(CountingApi::default());

        let err = ClientBuilder::new()
            .credentials_provider(Fixed(None))
            .store_factory(IsolatedStoreFactory)
            .secrets_api(api.clone())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = ClientBuilder::new()
            .credentials_provider(Fixed(Some(Credentials::new("https://h", ""))))
            .store_factory(IsolatedStoreFactory)
            .secrets_api(api.clone())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("missing host or apiToken")));

        let err = ClientBuilder::new()
            .credentials_provider(valid())
            .store_factory(NoStore)
            .secrets_api(api.clone())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("no store")));

        let err = ClientBuilder::new()
            .credentials_provider(valid())
            .secrets_api(api)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
