//! Error types for the stock-sheets client.

use std::path::PathBuf;
use thiserror::Error;

use crate::access::AccessError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failure talking to the application server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("server responded with status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    Decode(String),

    /// Pages behind login answer an unauthenticated request with a redirect
    /// into the OAuth flow instead of a 401.
    #[error("redirected to login at {0}")]
    LoginRedirect(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => ApiError::Status(status.as_u16()),
            None if e.is_decode() => ApiError::Decode(e.to_string()),
            None => ApiError::Transport(e.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Infrastructure
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Client(String),

    // ─────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Server responses
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Access(#[from] AccessError),

    #[error("could not read sheet row markup: {message}")]
    Markup { message: String },

    #[error("unrecognized timestamp: {value:?}")]
    Timestamp { value: String },

    // ─────────────────────────────────────────────────────────────
    // Sheet list state
    // ─────────────────────────────────────────────────────────────
    #[error("no sheet with id {ssheet_id}")]
    RowNotFound { ssheet_id: String },

    #[error("sheet {ssheet_id} is already listed")]
    DuplicateRow { ssheet_id: String },

    #[error("sheet {ssheet_id} has a request in flight")]
    RowBusy { ssheet_id: String },

    #[error("a sheet is already being created")]
    CreateInFlight,
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn markup(message: impl Into<String>) -> Self {
        Self::Markup {
            message: message.into(),
        }
    }

    pub fn row_not_found(ssheet_id: impl Into<String>) -> Self {
        Self::RowNotFound {
            ssheet_id: ssheet_id.into(),
        }
    }

    /// Whether the user has already been told about this failure through the page.
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            Error::Access(_) | Error::Markup { .. } | Error::Timestamp { .. }
        )
    }
}
