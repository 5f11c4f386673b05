//! Server response handling.
//!
//! Every Zulip REST response is a JSON object carrying an envelope next to
//! the endpoint's payload:
//! ```json
//! { "result": "success", "msg": "", "stream_id": 15 }
//! { "result": "error", "msg": "Invalid stream name 'nope'", "code": "BAD_REQUEST" }
//! ```
//! [`ApiResponse`] exposes the body as an object or a single field, and
//! converts "the field is not there" into a [`ZulipError::Api`] that keeps
//! the raw body for diagnostics.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use zulip_core::error::{ZulipError, ZulipResult};

/// Envelope key holding `"success"` or `"error"`.
pub const RESULT_KEY: &str = "result";
/// Envelope key holding the human-readable message.
pub const MSG_KEY: &str = "msg";
/// Envelope key holding the machine-readable error code.
pub const CODE_KEY: &str = "code";

/// A decoded response: HTTP status plus the JSON body.
///
/// Transport failures never produce an `ApiResponse`; they are the `Err`
/// side of [`crate::ZulipClient::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: u16,
    body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The decoded body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    /// The body as a JSON object, or `None` if it is an array or scalar.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.body.as_object()
    }

    /// The value stored at `key`, or `None` when the key is absent or the
    /// body is not an object.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }

    /// Whether the envelope says `"result": "success"`.
    pub fn is_success(&self) -> bool {
        self.field(RESULT_KEY).and_then(Value::as_str) == Some("success")
    }

    /// Whether the envelope says `"result": "error"`.
    pub fn is_error(&self) -> bool {
        self.field(RESULT_KEY).and_then(Value::as_str) == Some("error")
    }

    /// The server's `msg`, when it is non-empty.
    pub fn error_message(&self) -> Option<&str> {
        self.field(MSG_KEY)
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
    }

    /// The server's error `code`, if any.
    pub fn error_code(&self) -> Option<&str> {
        self.field(CODE_KEY).and_then(Value::as_str)
    }

    /// Build a domain error for this response.
    ///
    /// Prefers the server's own `msg`; falls back to `detail`.
    pub fn domain_error(&self, detail: impl Into<String>) -> ZulipError {
        let message = self
            .error_message()
            .map(str::to_string)
            .unwrap_or_else(|| detail.into());
        ZulipError::Api {
            code: self.error_code().map(str::to_string),
            message,
            response: self.body.clone(),
        }
    }

    /// Extract and deserialize a required field.
    pub fn extract<T: DeserializeOwned>(&self, key: &str) -> ZulipResult<T> {
        self.extract_optional(key)?
            .ok_or_else(|| self.domain_error(format!("response missing field \"{key}\"")))
    }

    /// Extract a field that the server may omit.
    ///
    /// Absence yields `Ok(None)`; an error envelope or a value of the wrong
    /// shape is still a domain error.
    pub fn extract_optional<T: DeserializeOwned>(&self, key: &str) -> ZulipResult<Option<T>> {
        if self.is_error() {
            return Err(self.domain_error(format!("server rejected the request (status {})", self.status)));
        }
        match self.field(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value).map(Some).map_err(|e| {
                self.domain_error(format!("field \"{key}\" has an unexpected shape: {e}"))
            }),
        }
    }

    /// Require `"result": "success"`, for endpoints that return nothing else.
    pub fn expect_success(&self) -> ZulipResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self.domain_error(format!("request failed (status {})", self.status)))
        }
    }

    /// The body object with the envelope keys removed.
    ///
    /// Used by endpoints whose payload is the top-level object itself.
    pub fn into_payload(self) -> ZulipResult<Map<String, Value>> {
        self.expect_success()?;
        match self.body {
            Value::Object(mut map) => {
                map.remove(RESULT_KEY);
                map.remove(MSG_KEY);
                Ok(map)
            }
            // is_success() already guarantees an object
            other => Err(ZulipError::Internal(format!("non-object success body: {other}"))),
        }
    }
}
