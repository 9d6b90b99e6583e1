//! CommandK client implementation
//!
//! [`Client`] fetches rendered app secrets and keeps the last fresh response
//! per (catalog app, environment) so later calls can be answered with
//! `304 Not Modified`.
//!
//! # Request flow
//!
//! ```text
//! no cached entry  -> unconditional GET -> 200: cache (if ETag) + return
//!                                       -> error: propagate
//! cached entry     -> GET If-None-Match -> 200: cache (if ETag) + return
//!                                       -> 304: return cached payload
//!                                       -> error: propagate
//! ```
//!
//! A `304` with nothing cached fails with [`Error::MissingCachedResponse`].
//! Failed calls never touch the cache. There are no retries.
//!
//! # Examples
//!
//! ```no_run
//! use commandk_sdk::{Client, GetRenderedSecretsOpts};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Credentials from COMMANDK_HOST / COMMANDK_API_TOKEN, process settings or
//! // COMMANDK_CONFIG_FILE; responses cached process-wide.
//! let client = Client::with_defaults()?;
//!
//! let secrets = client
//!     .get_rendered_app_secrets("catalog-app-id", "environment-id", GetRenderedSecretsOpts::default())
//!     .await?;
//! println!("{} secrets", secrets.len());
//! # Ok(())
//! # }
//! ```

use crate::{
    api::{FetchOutcome, RenderedSecretsRequest, SecretsApi},
    cache::{
        CacheStats, CachedResponse, GlobalStoreFactory, RequestFingerprint, ResponseStore,
        StoreFactory,
    },
    config::{ClientBuilder, ClientConfig},
    credentials::{Credentials, CredentialsProvider, CredentialsProviderChain},
    errors::{Error, Result},
    models::{GetRenderedSecretsOpts, RenderedAppSecret, RenderingMode},
    telemetry::{self, Metrics},
    transport::HttpSecretsApi,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// CommandK client
///
/// Bound for its whole life to the host and token resolved at construction
/// and to one response store. Cheap to clone; clones share the store and
/// statistics.
#[derive(Clone)]
pub struct Client {
    host: String,
    api: Arc<dyn SecretsApi>,
    store: Arc<dyn ResponseStore>,
    stats: CacheStats,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("api", &self.api)
            .field("store", &self.store)
            .finish()
    }
}

impl Client {
    /// Create a client from explicit dependencies
    ///
    /// Credentials are resolved once, here. See [`ClientBuilder::build`] for
    /// the failure cases.
    pub fn new(
        store_factory: impl StoreFactory + 'static,
        credentials_provider: impl CredentialsProvider + 'static,
    ) -> Result<Self> {
        ClientBuilder::new()
            .store_factory(store_factory)
            .credentials_provider(credentials_provider)
            .build()
    }

    /// Create a client with the default credentials chain and the
    /// process-wide response store
    pub fn with_defaults() -> Result<Self> {
        Self::new(GlobalStoreFactory, CredentialsProviderChain::default())
    }

    /// Create a builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_parts(
        credentials: Credentials,
        store: Arc<dyn ResponseStore>,
        api: Option<Arc<dyn SecretsApi>>,
        config: ClientConfig,
    ) -> Result<Self> {
        let metrics = telemetry::metrics_for(&config.telemetry_config);
        let host = credentials.host().to_string();

        let api = match api {
            Some(api) => api,
            None => Arc::new(HttpSecretsApi::with_metrics(
                credentials,
                &config,
                metrics.clone(),
            )?),
        };

        Ok(Self {
            host,
            api,
            store,
            stats: CacheStats::new(),
            metrics,
        })
    }

    /// Get cache statistics
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use commandk_sdk::Client;
    /// # fn example(client: &Client) {
    /// let stats = client.cache_stats();
    /// println!("Served from cache: {:.2}%", stats.hit_rate());
    /// # }
    /// ```
    pub fn cache_stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Host this client talks to
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the rendered secrets of a catalog app in one environment
    ///
    /// The previous fresh response for the same app and environment, if any,
    /// is revalidated with `If-None-Match`; on `304` it is returned as is.
    ///
    /// `opts.secret_names` is forwarded to the host but is not part of the
    /// cache key, so a filtered call and an unfiltered call for the same app
    /// and environment read and overwrite the same entry.
    ///
    /// # Errors
    ///
    /// * [`Error::MissingCachedResponse`] if the host answers `304` and nothing is cached
    /// * [`Error::Http`] for any other non-2xx status
    /// * [`Error::Network`] / [`Error::Timeout`] for transport failures
    /// * [`Error::Deserialize`] if the body cannot be parsed
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use commandk_sdk::{Client, GetRenderedSecretsOpts};
    /// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let all = client
    ///     .get_rendered_app_secrets("app-id", "env-id", GetRenderedSecretsOpts::default())
    ///     .await?;
    ///
    /// let some = client
    ///     .get_rendered_app_secrets(
    ///         "app-id",
    ///         "env-id",
    ///         GetRenderedSecretsOpts::default().secret_names(["DATABASE_URL"]),
    ///     )
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_rendered_app_secrets(
        &self,
        catalog_app_id: &str,
        environment_id: &str,
        opts: GetRenderedSecretsOpts,
    ) -> Result<Vec<RenderedAppSecret>> {
        let fingerprint = RequestFingerprint::new(catalog_app_id, environment_id);
        let cached = self.store.get(&fingerprint);

        match &cached {
            Some(entry) => trace!(catalog_app_id, environment_id, etag = %entry.etag, "revalidating cached response"),
            None => {
                trace!(catalog_app_id, environment_id, "no cached response");
                self.stats.record_miss();
                self.metrics.record_cache_miss(catalog_app_id);
            }
        }

        let request = RenderedSecretsRequest {
            catalog_app_id,
            environment_id,
            rendering_mode: RenderingMode::Full,
            if_none_match: cached.as_deref().map(|entry| entry.etag.as_str()),
            secret_names: opts.secret_names.as_deref(),
        };

        match self.api.get_rendered_app_secrets(&request).await? {
            FetchOutcome::Fresh { secrets, etag } => {
                if let Some(etag) = etag {
                    self.store.set(
                        fingerprint,
                        Arc::new(CachedResponse {
                            etag,
                            secrets: secrets.clone(),
                        }),
                    );
                    self.stats.record_insertion();
                    debug!(catalog_app_id, environment_id, "cached fresh response");
                }
                Ok(secrets)
            }
            FetchOutcome::NotModified => match cached {
                Some(entry) => {
                    debug!(catalog_app_id, environment_id, "not modified, serving cached response");
                    self.stats.record_hit();
                    self.metrics.record_cache_hit(catalog_app_id);
                    Ok(entry.secrets.clone())
                }
                None => Err(Error::MissingCachedResponse {
                    catalog_app_id: catalog_app_id.to_string(),
                    environment_id: environment_id.to_string(),
                }),
            },
        }
    }
}
