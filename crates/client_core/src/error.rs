use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("missing required fields: {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },
    #[error("at least one photo is required")]
    NoImages,
    #[error("a submission is already in progress")]
    AlreadySubmitting,
    #[error("the registration screen is closed")]
    Unmounted,
    #[error("failed to read image {uri}: {source}")]
    ImageUnreadable {
        uri: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode submission: {0}")]
    Encoding(String),
    #[error("{0}")]
    Network(String),
    #[error("{message}")]
    Server { status: u16, message: String },
}

impl SubmitError {
    /// Whether the backend was reached and may have seen the request.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("{0}")]
    Network(String),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl LoadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid api base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported api base url scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}
