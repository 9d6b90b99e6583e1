//! The remote call the client is built around
//!
//! [`SecretsApi`] is the seam between the caching client and the transport.
//! [`HttpSecretsApi`](crate::HttpSecretsApi) is the implementation used in
//! production; tests and embedders can supply their own.

use crate::{errors::Result, models::RenderedAppSecret, models::RenderingMode};
use async_trait::async_trait;
use std::fmt;

/// Parameters of one rendered-secrets request
#[derive(Debug, Clone, Copy)]
pub struct RenderedSecretsRequest<'a> {
    /// Catalog app to render secrets for
    pub catalog_app_id: &'a str,
    /// Environment to render secrets for
    pub environment_id: &'a str,
    /// How values are materialized
    pub rendering_mode: RenderingMode,
    /// `ETag` to send as `If-None-Match`; `None` sends an unconditional request
    pub if_none_match: Option<&'a str>,
    /// Optional filter on secret names
    pub secret_names: Option<&'a [String]>,
}

/// Successful outcome of a rendered-secrets request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The host sent a payload
    Fresh {
        /// Rendered secrets, in the order the host sent them
        secrets: Vec<RenderedAppSecret>,
        /// `ETag` response header, if any
        etag: Option<String>,
    },
    /// The host answered `304 Not Modified` to our `If-None-Match`
    NotModified,
}

/// Remote "get rendered app secrets" operation
///
/// Implementations make exactly one attempt per call. Every failure other
/// than `304 Not Modified` is returned as an [`Error`](crate::Error).
#[async_trait]
pub trait SecretsApi: Send + Sync + fmt::Debug {
    /// Fetch rendered secrets, honouring `request.if_none_match`
    async fn get_rendered_app_secrets(
        &self,
        request: &RenderedSecretsRequest<'_>,
    ) -> Result<FetchOutcome>;
}
