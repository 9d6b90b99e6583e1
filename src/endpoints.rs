//! API endpoint URL construction

use crate::util::{encode_path, encode_query};

/// SDK API base path
pub const SDK_API_BASE: &str = "/v1/sdk";

/// Endpoint builder
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    /// Create a new endpoints builder
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get the full URL for a path
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Rendered secrets of a catalog app in one environment
    pub fn rendered_app_secrets(
        &self,
        catalog_app_id: &str,
        environment_id: &str,
        rendering_mode: &str,
        secret_names: Option<&[String]>,
    ) -> String {
        let mut url = self.url(&format!(
            "{}/catalog-apps/{}/environments/{}/rendered-secrets",
            SDK_API_BASE,
            encode_path(catalog_app_id),
            encode_path(environment_id)
        ));

        url.push_str(&format!("?renderingMode={}", encode_query(rendering_mode)));
        for name in secret_names.unwrap_or_default() {
            url.push_str(&format!("&secretNames={}", encode_query(name)));
        }
        url
    }
}
