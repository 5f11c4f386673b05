//! Global error types for the Zulip client.
//!
//! Failures fall into two families. Transport errors mean no JSON body
//! could be interpreted (connection refused, timeout, garbage body).
//! Domain errors mean the server answered with JSON, but the answer lacked
//! the expected field or reported `"result": "error"`. Both travel through
//! the same `ZulipError` enum.

use thiserror::Error;

/// Convenience type alias for Results using ZulipError.
pub type ZulipResult<T> = Result<T, ZulipError>;

/// Unified error type covering all error categories.
#[derive(Error, Debug)]
pub enum ZulipError {
    // -- Configuration errors --
    /// Failed to load or parse configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Transport errors --
    /// HTTP request failed before a response body could be read.
    #[error("http error: {0}")]
    Http(String),

    /// HTTP request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// The server answered, but not with a JSON document.
    #[error("invalid response (status {status}): {message}")]
    InvalidResponse {
        /// HTTP status code.
        status: u16,
        /// Decoder error description.
        message: String,
    },

    // -- Domain errors --
    /// The server returned JSON that reports an error or lacks an expected field.
    #[error("{message}")]
    Api {
        /// Zulip error code (e.g. "BAD_REQUEST"), if the server sent one.
        code: Option<String>,
        /// Server `msg`, or a description of what was missing.
        message: String,
        /// The raw response body, kept for diagnostics.
        response: serde_json::Value,
    },

    // -- Local errors --
    /// Caller-supplied input could not be turned into request parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ZulipError {
    /// Whether the failure happened before a JSON body could be interpreted.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ZulipError::Http(_) | ZulipError::Timeout(_) | ZulipError::InvalidResponse { .. }
        )
    }

    /// Whether the server answered with JSON that did not satisfy the call.
    pub fn is_domain(&self) -> bool {
        matches!(self, ZulipError::Api { .. })
    }

    /// The Zulip error code, for domain errors that carry one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ZulipError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// The raw response body, for domain errors.
    pub fn response(&self) -> Option<&serde_json::Value> {
        match self {
            ZulipError::Api { response, .. } => Some(response),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ZulipError {
    fn from(e: serde_json::Error) -> Self {
        ZulipError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for ZulipError {
    fn from(e: toml::de::Error) -> Self {
        ZulipError::Config(e.to_string())
    }
}
