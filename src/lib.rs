//! Kagami: a source-agnostic extraction and media resolution pipeline
//!
//! This crate turns a declarative description of a media website (listing,
//! detail, episode/chapter and mirror selectors) into a normalized catalog,
//! ordered unit lists and playable media descriptors. Embedded player URLs are
//! resolved through a registry of per-host extractors.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod model;
pub mod paginate;
pub mod resolve;
pub mod source;
pub mod units;
pub mod url;

use thiserror::Error;

/// Main error type for Kagami operations
#[derive(Debug, Error)]
pub enum KagamiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Required field '{field}' missing on {url}")]
    RequiredFieldMissing { field: String, url: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("No resolver registered for {url}")]
    UnsupportedHost { url: String },

    #[error("Failed to decode {host} payload: {message}")]
    Decode { host: String, message: String },

    #[error("Source does not support {capability}")]
    Unsupported { capability: String },

    #[error("Unknown listing '{0}'")]
    UnknownListing(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl KagamiError {
    /// Returns true for the transient, network-class failures
    ///
    /// These are fatal for single-fetch operations and absorbed by fan-out
    /// operations (grouped unit listing, multi-mirror resolution).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Status { .. } | Self::Timeout { .. }
        )
    }

    /// Builds a decode error for the given host
    pub fn decode(host: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            host: host.to_string(),
            message: message.into(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Kagami operations
pub type Result<T> = std::result::Result<T, KagamiError>;

// Re-export commonly used types
pub use config::SourceConfig;
pub use model::{CatalogEntry, EntryStatus, MediaDescriptor, SearchQuery, Unit};
pub use resolve::{HostRegistry, MediaPreferences};
pub use source::{Capabilities, Source};
