//! Message endpoints.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use zulip_core::error::{ZulipError, ZulipResult};

use crate::client::ZulipClient;
use crate::narrow::Narrow;
use crate::request::Params;

/// Kind of message to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// A message to a stream, under a topic.
    Stream,
    /// A direct message to one or more users.
    Private,
}

impl MessageType {
    /// Wire value of the `type` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Stream => "stream",
            MessageType::Private => "private",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = ZulipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stream" | "streammessage" | "messagetype.streammessage" => Ok(MessageType::Stream),
            "private" | "direct" | "privatemessage" | "messagetype.privatemessage" => {
                Ok(MessageType::Private)
            }
            other => Err(ZulipError::InvalidInput(format!(
                "unknown message type \"{other}\" (expected stream or private)"
            ))),
        }
    }
}

/// Where a message fetch is centred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// A specific message id.
    Id(u64),
    /// The most recent message.
    Newest,
    /// The oldest message.
    Oldest,
    /// The first unread message.
    FirstUnread,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Id(id) => write!(f, "{id}"),
            Anchor::Newest => f.write_str("newest"),
            Anchor::Oldest => f.write_str("oldest"),
            Anchor::FirstUnread => f.write_str("first_unread"),
        }
    }
}

impl FromStr for Anchor {
    type Err = ZulipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "newest" => Ok(Anchor::Newest),
            "oldest" => Ok(Anchor::Oldest),
            "first_unread" => Ok(Anchor::FirstUnread),
            other => other
                .parse::<u64>()
                .map(Anchor::Id)
                .map_err(|_| ZulipError::InvalidInput(format!("invalid anchor \"{other}\""))),
        }
    }
}

/// Message endpoints, borrowed from a [`ZulipClient`].
#[derive(Clone, Copy)]
pub struct Messages<'a> {
    client: &'a ZulipClient,
}

impl ZulipClient {
    pub fn messages(&self) -> Messages<'_> {
        Messages { client: self }
    }
}

impl Messages<'_> {
    /// Send a message. Returns the new message id.
    ///
    /// `to` is a stream name for stream messages and a comma-separated list
    /// of emails for private ones. `subject` is the topic and is only sent
    /// for stream messages.
    pub async fn send(
        &self,
        message_type: MessageType,
        to: &str,
        subject: &str,
        content: &str,
    ) -> ZulipResult<u64> {
        let mut params = Params::new()
            .with("type", message_type.as_str())
            .with("to", to)
            .with("content", content);
        if message_type == MessageType::Stream {
            params = params.with("subject", subject);
        }

        let resp = self.client.post("/messages", params).await?;
        let id = resp.extract("id")?;
        debug!("sent {message_type} message {id}");
        Ok(id)
    }

    /// Fetch messages around `anchor` that match `narrow`.
    pub async fn get(
        &self,
        narrow: &Narrow,
        anchor: Anchor,
        num_before: u32,
        num_after: u32,
    ) -> ZulipResult<Vec<Value>> {
        let params = Params::new()
            .with_json("narrow", narrow)?
            .with("anchor", anchor.to_string())
            .with("num_before", num_before.to_string())
            .with("num_after", num_after.to_string());

        let resp = self.client.get("/messages", params).await?;
        resp.extract("messages")
    }

    /// Render Zulip markdown to HTML without sending anything.
    pub async fn render(&self, content: &str) -> ZulipResult<String> {
        let params = Params::new().with("content", content);
        let resp = self.client.post("/messages/render", params).await?;
        resp.extract("rendered")
    }

    /// Replace the content of a message.
    pub async fn update(&self, message_id: u64, content: &str) -> ZulipResult<()> {
        let params = Params::new().with("content", content);
        let resp = self
            .client
            .patch(&format!("/messages/{message_id}"), params)
            .await?;
        resp.expect_success()
    }
}
