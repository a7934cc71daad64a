//! Zhihu-Comments: an authenticated client for Zhihu's private JSON API
//!
//! This crate signs requests with the current session's cookies, searches for
//! posts by keyword and walks every page of a post's comment tree (root
//! comments plus all nested replies), delivering pages incrementally to a sink.

pub mod client;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod model;
pub mod output;
pub mod session;

use thiserror::Error;

/// Main error type for Zhihu-Comments operations
#[derive(Debug, Error)]
pub enum ZhihuError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required cookie `{cookie}` in session")]
    MissingCredential { cookie: &'static str },

    #[error("Session is not logged in; refresh its cookies")]
    SessionNotAlive,

    #[error("Forbidden response from {url}: {body}")]
    Forbidden { url: String, body: String },

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Request signing failed: {0}")]
    Sign(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Comment sink failed: {0}")]
    Sink(anyhow::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ZhihuError {
    /// Whether a failed request attempt may be retried by the transport
    ///
    /// Forbidden responses and missing credentials are never retried: the
    /// session has to be refreshed before another attempt can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ZhihuError::Fetch { .. }
                | ZhihuError::Http { .. }
                | ZhihuError::Timeout { .. }
                | ZhihuError::Sign(_)
        )
    }

    /// Whether this error means the session is likely no longer valid
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ZhihuError::Forbidden { .. })
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
}

/// Result type alias for Zhihu-Comments operations
pub type Result<T> = std::result::Result<T, ZhihuError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{Payload, Signer, ZhihuClient};
pub use config::Config;
pub use crawler::{CommentCrawler, CommentSink, WalkOptions};
pub use extract::{Extractor, JsonExtractor};
pub use model::{Comment, Content, ContentType};
pub use session::{Cookie, Session};
