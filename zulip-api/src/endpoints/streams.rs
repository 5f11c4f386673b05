//! Stream and subscription endpoints.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use zulip_core::error::ZulipResult;

use crate::client::ZulipClient;
use crate::request::Params;

/// Which streams `GET /streams` should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFilter {
    pub include_public: bool,
    pub include_subscribed: bool,
    pub include_default: bool,
    /// Requires an administrator account; the server rejects it otherwise.
    pub include_all_active: bool,
}

impl Default for StreamFilter {
    fn default() -> Self {
        Self {
            include_public: true,
            include_subscribed: true,
            include_default: false,
            include_all_active: false,
        }
    }
}

/// A stream to subscribe to, created on the fly if it does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StreamSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Outcome of `POST /users/me/subscriptions`.
///
/// `subscribed` and `already_subscribed` map a user's email to stream names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeResult {
    pub subscribed: BTreeMap<String, Vec<String>>,
    pub already_subscribed: BTreeMap<String, Vec<String>>,
    /// Streams the caller may not subscribe to (invite-only).
    pub unauthorized: Vec<String>,
}

impl SubscribeResult {
    /// Every stream newly subscribed for any user.
    pub fn subscribed_streams(&self) -> BTreeSet<&str> {
        self.subscribed
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Whether `stream` was newly subscribed for any user.
    pub fn newly_subscribed(&self, stream: &str) -> bool {
        self.subscribed.values().flatten().any(|s| s == stream)
    }
}

/// Outcome of `DELETE /users/me/subscriptions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeResult {
    pub removed: Vec<String>,
    pub not_subscribed: Vec<String>,
}

/// Stream endpoints, borrowed from a [`ZulipClient`].
#[derive(Clone, Copy)]
pub struct Streams<'a> {
    client: &'a ZulipClient,
}

impl ZulipClient {
    pub fn streams(&self) -> Streams<'_> {
        Streams { client: self }
    }
}

impl Streams<'_> {
    /// List the streams the user can access.
    pub async fn get_all(&self, filter: StreamFilter) -> ZulipResult<Vec<Value>> {
        let params = Params::new()
            .with_bool("include_public", filter.include_public)
            .with_bool("include_subscribed", filter.include_subscribed)
            .with_bool("include_default", filter.include_default)
            .with_bool("include_all_active", filter.include_all_active);

        let resp = self.client.get("/streams", params).await?;
        resp.extract("streams")
    }

    /// Look up a stream's id by name.
    pub async fn get_id(&self, name: &str) -> ZulipResult<u64> {
        let params = Params::new().with("stream", name);
        let resp = self.client.get("/get_stream_id", params).await?;
        resp.extract("stream_id")
    }

    /// List the streams the user is subscribed to.
    pub async fn get_subscribed(&self) -> ZulipResult<Vec<Value>> {
        let resp = self
            .client
            .get("/users/me/subscriptions", Params::new())
            .await?;
        resp.extract("subscriptions")
    }

    /// Subscribe the user (or `principals`, if non-empty) to streams.
    pub async fn subscribe(
        &self,
        streams: &[StreamSpec],
        principals: &[String],
    ) -> ZulipResult<SubscribeResult> {
        let mut params = Params::new().with_json("subscriptions", streams)?;
        if !principals.is_empty() {
            params = params.with_json("principals", principals)?;
        }

        let resp = self
            .client
            .post("/users/me/subscriptions", params)
            .await?;

        Ok(SubscribeResult {
            subscribed: resp.extract("subscribed")?,
            already_subscribed: resp.extract("already_subscribed")?,
            unauthorized: resp.extract_optional("unauthorized")?.unwrap_or_default(),
        })
    }

    /// Unsubscribe the user (or `principals`, if non-empty) from streams.
    pub async fn unsubscribe(
        &self,
        stream_names: &[String],
        principals: &[String],
    ) -> ZulipResult<UnsubscribeResult> {
        let mut params = Params::new().with_json("subscriptions", stream_names)?;
        if !principals.is_empty() {
            params = params.with_json("principals", principals)?;
        }

        let resp = self
            .client
            .delete("/users/me/subscriptions", params)
            .await?;

        Ok(UnsubscribeResult {
            removed: resp.extract("removed")?,
            not_subscribed: resp.extract("not_subscribed")?,
        })
    }
}
