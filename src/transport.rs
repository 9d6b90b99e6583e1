//! HTTP implementation of [`SecretsApi`]
//!
//! Built on `reqwest`. One request per call, no retries; `304` is reported as
//! [`FetchOutcome::NotModified`], `200` as [`FetchOutcome::Fresh`] and every
//! other status as [`Error::Http`].

use crate::{
    api::{FetchOutcome, RenderedSecretsRequest, SecretsApi},
    config::ClientConfig,
    credentials::Credentials,
    endpoints::Endpoints,
    errors::{Error, ErrorResponse, Result},
    models::RenderedAppSecretsResponse,
    telemetry::Metrics,
    util::{generate_request_id, header_str},
};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

const USER_AGENT_PREFIX: &str = "commandk-sdk-rust";

/// Talks to the CommandK SDK API over HTTPS with a bearer token
#[derive(Clone)]
pub struct HttpSecretsApi {
    http: HttpClient,
    endpoints: Endpoints,
    credentials: Credentials,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for HttpSecretsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSecretsApi")
            .field("host", &self.credentials.host())
            .finish()
    }
}

impl HttpSecretsApi {
    /// Create a transport bound to `credentials`
    ///
    /// Fails with [`Error::Config`] if the host is not an `https://` URL (or an
    /// `http://` URL with insecure HTTP allowed) or the HTTP client cannot be built.
    pub fn new(credentials: Credentials, config: &ClientConfig) -> Result<Self> {
        Self::with_metrics(
            credentials,
            config,
            crate::telemetry::metrics_for(&config.telemetry_config),
        )
    }

    pub(crate) fn with_metrics(
        credentials: Credentials,
        config: &ClientConfig,
        metrics: Arc<Metrics>,
    ) -> Result<Self> {
        credentials.validate()?;
        let host = credentials.host().trim().trim_end_matches('/');

        if host.starts_with("http://") && !config.allow_insecure_http {
            return Err(Error::Config(
                "HTTP hosts are not allowed. Use an https:// host or .danger_allow_insecure_http() (dangerous!)"
                    .to_string(),
            ));
        }
        if !host.starts_with("http://") && !host.starts_with("https://") {
            return Err(Error::Config(
                "Host must start with http:// or https://".to_string(),
            ));
        }

        let endpoints = Endpoints::new(host);

        // Build user agent
        let user_agent = if let Some(suffix) = &config.user_agent_suffix {
            format!("{}/{} {}", USER_AGENT_PREFIX, crate::VERSION, suffix)
        } else {
            format!("{}/{}", USER_AGENT_PREFIX, crate::VERSION)
        };

        let http = HttpClient::builder()
            .user_agent(user_agent)
            .timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .https_only(!config.allow_insecure_http)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoints,
            http,
            credentials,
            metrics,
        })
    }

    /// Build a request with common headers
    fn build_request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let (auth_header, auth_value) = self.credentials.authorization_header();

        self.http
            .request(method, url)
            .header(auth_header, auth_value)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-Request-ID", generate_request_id())
    }

    /// Send a request once, translating transport failures
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let started = Instant::now();
        match request.send().await {
            Ok(response) => {
                self.metrics
                    .record_request(response.status().as_u16(), started.elapsed().as_secs_f64());
                Ok(response)
            }
            Err(e) => {
                let error = Error::from(e);
                self.metrics.record_transport_error(match &error {
                    Error::Timeout => "timeout",
                    Error::Network(_) => "network",
                    _ => "other",
                });
                Err(error)
            }
        }
    }

    /// Parse error response from server
    async fn parse_error_response(&self, response: Response) -> Error {
        let status = response.status().as_u16();
        let request_id = header_str(response.headers(), "x-request-id");

        match response.json::<ErrorResponse>().await {
            Ok(ErrorResponse {
                error: Some(error),
                message,
            }) => Error::from_response(
                status,
                &error,
                message.as_deref().unwrap_or("no message"),
                request_id,
            ),
            Ok(ErrorResponse {
                error: None,
                message: Some(message),
            }) => Error::from_response(status, "unknown", &message, request_id),
            _ => Error::Http {
                status,
                category: "unknown".to_string(),
                message: format!("Response from host: {}", status),
                request_id,
            },
        }
    }
}

#[async_trait]
impl SecretsApi for HttpSecretsApi {
    async fn get_rendered_app_secrets(
        &self,
        request: &RenderedSecretsRequest<'_>,
    ) -> Result<FetchOutcome> {
        let url = self.endpoints.rendered_app_secrets(
            request.catalog_app_id,
            request.environment_id,
            request.rendering_mode.as_str(),
            request.secret_names,
        );
        let mut builder = self.build_request(Method::GET, &url);

        if let Some(etag) = request.if_none_match.filter(|etag| !etag.is_empty()) {
            builder = builder.header(reqwest::header::IF_NONE_MATCH, etag);
        }

        let response = self.execute(builder).await?;
        let status = response.status();
        trace!(%status, catalog_app_id = request.catalog_app_id, "rendered secrets response");

        if status == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }
        // Only 200 carries a payload; any other status, 2xx included, is an error.
        if status != StatusCode::OK {
            return Err(self.parse_error_response(response).await);
        }

        let etag = header_str(response.headers(), "etag");
        let bytes = response.bytes().await?;
        let body: RenderedAppSecretsResponse = serde_json::from_slice(&bytes)?;
        debug!(
            count = body.secrets.len(),
            has_etag = etag.is_some(),
            "fetched rendered secrets"
        );

        Ok(FetchOutcome::Fresh {
            secrets: body.secrets,
            etag,
        })
    }
}
