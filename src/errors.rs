//! Error types and handling for the CommandK SDK
//!
//! Errors fall into three groups:
//!
//! - **Configuration**: a builder dependency is missing ([`Error::InvalidArgument`])
//!   or credentials, the config file, the store factory or the host URL are
//!   unusable ([`Error::Config`]). These are fatal and never retried.
//! - **Remote**: anything the CommandK host or the transport reports other than
//!   a fresh payload or `304 Not Modified` ([`Error::Http`], [`Error::Network`],
//!   [`Error::Timeout`], [`Error::Deserialize`], [`Error::Other`]).
//! - **Cache desynchronization**: the host answered `304` but nothing is cached
//!   for the request ([`Error::MissingCachedResponse`]).
//!
//! Nothing in the SDK retries; that is left to the caller.
//!
//! # Example
//!
//! ```no_run
//! # use commandk_sdk::{Client, Error, GetRenderedSecretsOpts};
//! # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
//! match client
//!     .get_rendered_app_secrets("app-id", "env-id", GetRenderedSecretsOpts::default())
//!     .await
//! {
//!     Ok(secrets) => println!("Got {} secrets", secrets.len()),
//!     Err(Error::Http { status: 403, .. }) => println!("Access denied"),
//!     Err(Error::Timeout) => println!("Request timed out"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Result type alias for the SDK
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SDK
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP error from the API
    #[error("http {status}: {category} - {message} (req={request_id:?})")]
    Http {
        /// HTTP status code
        status: u16,
        /// Error category from server, `unknown` when the body carried none
        category: String,
        /// Error message from server
        message: String,
        /// Request ID from x-request-id header
        request_id: Option<String>,
    },

    /// The host answered `304 Not Modified` but no cached response exists
    #[error("cannot find cached response for get_rendered_app_secrets({catalog_app_id}, {environment_id})")]
    MissingCachedResponse {
        /// Catalog app the request was made for
        catalog_app_id: String,
        /// Environment the request was made for
        environment_id: String,
    },

    /// Deserialization error
    #[error("deserialize: {0}")]
    Deserialize(String),

    /// Network error
    #[error("network: {0}")]
    Network(String),

    /// Request timeout
    #[error("timeout")]
    Timeout,

    /// A required dependency was not supplied to the client builder
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("config: {0}")]
    Config(String),

    /// Other errors
    #[error("other: {0}")]
    Other(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Authentication/authorization errors (401/403)
    Auth,
    /// Validation errors (400)
    Validation,
    /// Resource not found (404)
    NotFound,
    /// Rate limit exceeded (429)
    RateLimit,
    /// Request timeout (408 or transport deadline)
    Timeout,
    /// Internal server error (5xx)
    Internal,
    /// Transport could not reach the host
    Network,
    /// Missing builder dependency or unusable configuration
    Config,
    /// `304` received with an empty cache
    CacheDesync,
    /// Other/unknown error
    Other,
}

impl ErrorKind {
    /// Parse error kind from server error category string
    pub fn from_category(category: &str) -> Self {
        match category {
            "auth" | "unauthorized" | "forbidden" => ErrorKind::Auth,
            "validation" | "bad_request" => ErrorKind::Validation,
            "not_found" => ErrorKind::NotFound,
            "rate_limit" => ErrorKind::RateLimit,
            "timeout" => ErrorKind::Timeout,
            "internal" => ErrorKind::Internal,
            _ => ErrorKind::Other,
        }
    }

    /// Derive an error kind from an HTTP status when the body carried no category
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorKind::Auth,
            400 | 422 => ErrorKind::Validation,
            404 => ErrorKind::NotFound,
            408 => ErrorKind::Timeout,
            429 => ErrorKind::RateLimit,
            500..=599 => ErrorKind::Internal,
            _ => ErrorKind::Other,
        }
    }
}

impl Error {
    /// Get the error kind for categorization
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http {
                status, category, ..
            } => match ErrorKind::from_category(category) {
                ErrorKind::Other => ErrorKind::from_status(*status),
                kind => kind,
            },
            Error::MissingCachedResponse { .. } => ErrorKind::CacheDesync,
            Error::Network(_) => ErrorKind::Network,
            Error::Timeout => ErrorKind::Timeout,
            Error::InvalidArgument(_) | Error::Config(_) => ErrorKind::Config,
            Error::Deserialize(_) | Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Get the HTTP status code if this is an HTTP error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the request ID if available
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Http { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// Create an HTTP error from server response
    pub(crate) fn from_response(
        status: u16,
        error: &str,
        message: &str,
        request_id: Option<String>,
    ) -> Self {
        Error::Http {
            status,
            category: error.to_string(),
            message: message.to_string(),
            request_id,
        }
    }
}

/// Server error response structure
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default, alias = "code")]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if err.is_connect() || err.is_request() {
            Error::Network(err.to_string())
        } else if err.is_decode() {
            Error::Deserialize(err.to_string())
        } else {
            Error::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Deserialize(err.to_string())
    }
}
