//! CommandK SDK for Rust
//!
//! Fetches rendered application secrets from a CommandK host, revalidating
//! earlier responses with `ETag` / `If-None-Match` so unchanged secrets are
//! not transferred twice.
//!
//! # Features
//!
//! - Async/await support with tokio runtime
//! - Conditional GET caching keyed by catalog app and environment
//! - Process-wide or per-client response stores
//! - Layered credentials: environment variables, process settings, config file
//! - Secure value handling with zeroization
//! - Optional OpenTelemetry metrics (`metrics` feature)
//!
//! # Example
//!
//! ```no_run
//! use commandk_sdk::{Client, GetRenderedSecretsOpts};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::with_defaults()?;
//!
//!     let secrets = client
//!         .get_rendered_app_secrets("catalog-app-id", "environment-id", GetRenderedSecretsOpts::default())
//!         .await?;
//!     for secret in &secrets {
//!         println!("{} ({:?})", secret.key, secret.value_type);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![deny(
    missing_docs,
    missing_debug_implementations,
    unsafe_code,
    unused_results
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod api;
mod cache;
mod client;
mod config;
mod config_file;
mod credentials;
mod endpoints;
mod errors;
mod models;
pub mod settings;
/// Telemetry and observability support
#[cfg(feature = "metrics")]
pub mod telemetry;

#[cfg(not(feature = "metrics"))]
mod telemetry;
mod transport;
mod util;

pub use api::{FetchOutcome, RenderedSecretsRequest, SecretsApi};
pub use cache::{
    CacheStats, CachedResponse, GlobalStoreFactory, InMemoryStore, IsolatedStoreFactory,
    RequestFingerprint, ResponseStore, StoreFactory,
};
pub use client::Client;
pub use config::{ClientBuilder, ClientConfig};
pub use config_file::{read_credentials_file, ConfigFileProvider};
pub use credentials::{
    Credentials, CredentialsProvider, CredentialsProviderChain, EnvironmentVariablesProvider,
    ProcessSettingsProvider,
};
pub use errors::{Error, ErrorKind, Result};
pub use models::*;
pub use transport::HttpSecretsApi;

// Re-export commonly used types
pub use secrecy::{ExposeSecret, SecretString};

/// SDK version, matches Cargo.toml version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
