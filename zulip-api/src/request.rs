//! Request values handed to the dispatcher.
//!
//! An [`ApiRequest`] lives for exactly one call: it is built by an endpoint
//! wrapper, consumed by [`crate::ZulipClient::dispatch`], and dropped.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;

use zulip_core::error::{ZulipError, ZulipResult};

/// String-keyed request parameters.
///
/// Sent as the query string for GET and as a form-encoded body for every
/// other verb. Keys are kept sorted so requests are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain string parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Add a boolean parameter, encoded as `"true"` / `"false"`.
    pub fn with_bool(self, key: impl Into<String>, value: bool) -> Self {
        self.with(key, if value { "true" } else { "false" })
    }

    /// Add a parameter whose value is the JSON encoding of `value`.
    ///
    /// Zulip expects lists and objects (narrows, stream lists, event types)
    /// as JSON text inside an ordinary form field.
    pub fn with_json<T>(self, key: impl Into<String>, value: &T) -> ZulipResult<Self>
    where
        T: Serialize + ?Sized,
    {
        let key = key.into();
        let encoded = serde_json::to_string(value).map_err(|e| {
            ZulipError::InvalidInput(format!("cannot encode parameter {key}: {e}"))
        })?;
        Ok(self.with(key, encoded))
    }

    /// Look up a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// HTTP basic-auth credential pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// One HTTP request: verb, absolute URL, parameters, optional credentials.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub params: Params,
    pub credentials: Option<Credentials>,
    /// Overrides the client's timeout for this request only.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// Create a request with no parameters and no credentials.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Params::new(),
            credentials: None,
            timeout: None,
        }
    }

    /// Replace the parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Attach basic-auth credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether parameters travel in the query string rather than the body.
    pub fn params_in_query(&self) -> bool {
        self.method == Method::GET
    }
}
