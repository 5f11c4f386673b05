//! HTTP client for the Zulip server REST API.
//!
//! Builds one request per call (verb, URL, parameters, basic auth), sends
//! it, and decodes the JSON body. There is no retry, no backoff and no
//! client-side caching: every call maps to exactly one HTTP exchange.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, Response};
use tracing::{debug, trace};

use zulip_core::config::ServerConfig;
use zulip_core::constants;
use zulip_core::error::{ZulipError, ZulipResult};

use crate::request::{ApiRequest, Credentials, Params};
use crate::response::ApiResponse;

/// HTTP client for communicating with a Zulip realm.
///
/// Cheap to clone: the connection pool and the configuration are shared.
/// The configuration is read-only for the lifetime of the client.
#[derive(Clone)]
pub struct ZulipClient {
    inner: Client,
    config: Arc<ServerConfig>,
    /// Base URL for the API (e.g. "https://chat.example.com/api/v1").
    api_root: String,
    /// Timeout for requests the server may hold open (blocking event polls).
    extended_timeout: Duration,
}

impl ZulipClient {
    /// Create a new client from server configuration.
    ///
    /// Only the realm URL is required here; credentials are checked when an
    /// authenticated endpoint is called.
    pub fn new(config: ServerConfig) -> ZulipResult<Self> {
        if config.realm_url.trim().is_empty() {
            return Err(ZulipError::MissingConfig("realm URL".into()));
        }

        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&constants::user_agent())
            .map_err(|e| ZulipError::Internal(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let timeout = Duration::from_millis(config.api_timeout_ms);
        let extended_timeout = (timeout * constants::EXTENDED_TIMEOUT_MULTIPLIER)
            .max(Duration::from_secs(constants::LONG_POLL_TIMEOUT_SECS));

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(constants::CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30));

        if config.accept_self_signed_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let inner = builder
            .build()
            .map_err(|e| ZulipError::Http(format!("failed to build HTTP client: {e}")))?;

        let api_root = config.api_url();
        debug!("zulip client created for {api_root}");

        Ok(Self {
            inner,
            config: Arc::new(config),
            api_root,
            extended_timeout,
        })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Timeout used by [`Self::get_extended`].
    pub fn extended_timeout(&self) -> Duration {
        self.extended_timeout
    }

    /// Get the API root URL.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Build the full URL for an API path such as `/messages`.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.api_root)
        } else {
            format!("{}/{path}", self.api_root)
        }
    }

    /// The configured (email, API key) pair.
    pub fn credentials(&self) -> ZulipResult<Credentials> {
        if self.config.email.is_empty() {
            return Err(ZulipError::MissingConfig("email address".into()));
        }
        if self.config.api_key.is_empty() {
            return Err(ZulipError::MissingConfig("API key".into()));
        }
        Ok(Credentials::new(&self.config.email, &self.config.api_key))
    }

    /// Send one request and decode its JSON body.
    ///
    /// Parameters go in the query string for GET and in a form-encoded body
    /// otherwise. Basic auth is attached only when the request carries
    /// credentials. A non-2xx status with a JSON body is still returned as
    /// an [`ApiResponse`]; only transport failures and non-JSON bodies are
    /// errors here.
    pub async fn dispatch(&self, request: ApiRequest) -> ZulipResult<ApiResponse> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self.inner.request(request.method.clone(), &request.url);

        if request.params_in_query() {
            if !request.params.is_empty() {
                builder = builder.query(&request.params);
            }
        } else if !request.params.is_empty() {
            builder = builder.form(&request.params);
        }

        if let Some(creds) = &request.credentials {
            builder = builder.basic_auth(&creds.username, Some(&creds.secret));
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(Self::classify_error)?;
        Self::decode(response).await
    }

    /// Read a response body and parse it as JSON.
    async fn decode(response: Response) -> ZulipResult<ApiResponse> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ZulipError::Http(format!("failed to read response body: {e}")))?;
        trace!("response status {status}, {} bytes", text.len());

        let body = serde_json::from_str(&text).map_err(|e| ZulipError::InvalidResponse {
            status,
            message: format!("body is not JSON: {e}"),
        })?;

        Ok(ApiResponse::new(status, body))
    }

    /// Classify a reqwest error into a ZulipError variant.
    fn classify_error(e: reqwest::Error) -> ZulipError {
        if e.is_timeout() {
            ZulipError::Timeout(e.to_string())
        } else if e.is_connect() {
            ZulipError::Http(format!("connection failed: {e}"))
        } else {
            ZulipError::Http(e.to_string())
        }
    }

    /// Dispatch an authenticated request to an API path.
    async fn authenticated(
        &self,
        method: Method,
        path: &str,
        params: Params,
        timeout: Option<Duration>,
    ) -> ZulipResult<ApiResponse> {
        let mut request = ApiRequest::new(method, self.url(path))
            .params(params)
            .credentials(self.credentials()?);
        request.timeout = timeout;
        self.dispatch(request).await
    }

    // --- Public HTTP methods ---

    /// Execute an authenticated GET request.
    pub async fn get(&self, path: &str, params: Params) -> ZulipResult<ApiResponse> {
        self.authenticated(Method::GET, path, params, None).await
    }

    /// Execute an authenticated GET request with the extended timeout, for
    /// calls the server may hold open.
    pub async fn get_extended(&self, path: &str, params: Params) -> ZulipResult<ApiResponse> {
        self.authenticated(Method::GET, path, params, Some(self.extended_timeout))
            .await
    }

    /// Execute an authenticated POST request.
    pub async fn post(&self, path: &str, params: Params) -> ZulipResult<ApiResponse> {
        self.authenticated(Method::POST, path, params, None).await
    }

    /// Execute an authenticated PATCH request.
    pub async fn patch(&self, path: &str, params: Params) -> ZulipResult<ApiResponse> {
        self.authenticated(Method::PATCH, path, params, None).await
    }

    /// Execute an authenticated DELETE request.
    pub async fn delete(&self, path: &str, params: Params) -> ZulipResult<ApiResponse> {
        self.authenticated(Method::DELETE, path, params, None).await
    }

    /// Execute a GET request without credentials.
    pub async fn get_anonymous(&self, path: &str, params: Params) -> ZulipResult<ApiResponse> {
        self.dispatch(ApiRequest::new(Method::GET, self.url(path)).params(params))
            .await
    }
}
