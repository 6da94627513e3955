//! Error types shared across the core crate.

use std::path::PathBuf;

use thiserror::Error;

/// Failure talking to the remote weather API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request could not be sent or the body could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        /// Response body, truncated.
        body: String,
    },

    /// The body was not the JSON we expected.
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The two ways a lookup can fail.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Autocomplete lookup failed. Never shown to the user.
    #[error("failed to fetch city suggestions: {0}")]
    Suggestions(#[source] ProviderError),

    /// Main weather lookup failed. The message is the one the user sees,
    /// whatever the underlying cause.
    #[error("City not found")]
    Weather(#[source] ProviderError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize stored value: {0}")]
    Serialize(#[from] serde_json::Error),
}
