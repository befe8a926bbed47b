//! Error type of the plugin client.

use apis::PluginError;
use thiserror::Error;

/// Failure of a plugin client call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL cannot address plugin routes.
    #[error("invalid plugin base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The request could not be sent or the response could not be read.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A successful response carried a body of the wrong shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The plugin answered with an error status.
    #[error(transparent)]
    Plugin(#[from] PluginError),
}

impl ClientError {
    /// The plugin error, when the plugin rejected the call.
    pub fn plugin_error(&self) -> Option<&PluginError> {
        match self {
            ClientError::Plugin(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` when the plugin answered 404.
    pub fn is_not_found(&self) -> bool {
        self.plugin_error().is_some_and(PluginError::is_not_found)
    }
}

/// Result type of client calls.
pub type ClientResult<T> = Result<T, ClientError>;
