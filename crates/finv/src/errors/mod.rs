//! Error types for the finv crate.
//!
//! Every fallible operation in the crate returns [`FinvError`]. The lenient
//! entry points on [`crate::Finv`] log these errors and degrade to absent data;
//! the `try_*` entry points hand them to the caller.

use thiserror::Error;

/// Errors that can occur while fetching, parsing or exporting instrument data.
#[derive(Error, Debug)]
pub enum FinvError {
    /// The request could not be sent or the body could not be read
    /// (connection refused, DNS failure, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a status other than 200.
    #[error("Unexpected status {status} from {url}")]
    Status {
        /// HTTP status code returned by the provider
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// The cookie or crumb needed for an authenticated request is unavailable.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The response body did not have the expected shape.
    #[error("Parse error in {context}: {message}")]
    Parse {
        /// Which extraction failed (e.g. "history", "quote")
        context: &'static str,
        /// What was wrong with the payload
        message: String,
    },

    /// The caller supplied something the provider cannot use.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serializing an instrument for export failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be decoded or encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FinvError {
    /// Shorthand for building a [`FinvError::Parse`].
    pub fn parse(context: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            context,
            message: message.into(),
        }
    }

    /// Whether the failure happened before a usable response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}
