//! Event queue endpoints.
//!
//! Registering a queue and polling it are independent calls. The caller
//! keeps the last event id it has seen and passes it back on the next poll;
//! [`EventPoller`] does that bookkeeping for long-running listeners.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use zulip_core::error::ZulipResult;

use crate::client::ZulipClient;
use crate::narrow::Narrow;
use crate::request::Params;

/// Server error code for an expired or unknown queue.
pub const BAD_EVENT_QUEUE_ID: &str = "BAD_EVENT_QUEUE_ID";

/// Options for `POST /register`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterOptions {
    pub apply_markdown: bool,
    pub client_gravatar: bool,
    /// Event types to receive. `None` asks for every type; `Some(vec![])`
    /// asks for none.
    pub event_types: Option<Vec<String>>,
    pub all_public_streams: bool,
    pub include_subscribers: bool,
    pub narrow: Narrow,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self {
            apply_markdown: true,
            client_gravatar: false,
            event_types: None,
            all_public_streams: false,
            include_subscribers: false,
            narrow: Narrow::new(),
        }
    }
}

/// A registered event queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventQueue {
    pub queue_id: String,
    /// Id of the last event already reflected in `state`; poll from here.
    pub last_event_id: i64,
    /// Initial state snapshot returned alongside the queue.
    #[serde(flatten)]
    pub state: Map<String, Value>,
}

/// Highest event `id` in a batch, if any event carries one.
pub fn last_event_id(events: &[Value]) -> Option<i64> {
    events
        .iter()
        .filter_map(|event| event.get("id").and_then(Value::as_i64))
        .max()
}

/// Event queue endpoints, borrowed from a [`ZulipClient`].
#[derive(Clone, Copy)]
pub struct Events<'a> {
    client: &'a ZulipClient,
}

impl ZulipClient {
    pub fn events(&self) -> Events<'_> {
        Events { client: self }
    }
}

impl Events<'_> {
    /// Register a new event queue.
    pub async fn register(&self, options: &RegisterOptions) -> ZulipResult<EventQueue> {
        let mut params = Params::new()
            .with_bool("apply_markdown", options.apply_markdown)
            .with_bool("client_gravatar", options.client_gravatar)
            .with_bool("all_public_streams", options.all_public_streams)
            .with_bool("include_subscribers", options.include_subscribers)
            .with_json("narrow", &options.narrow)?;
        if let Some(types) = &options.event_types {
            params = params.with_json("event_types", types)?;
        }

        let resp = self.client.post("/register", params).await?;
        let queue_id: String = resp.extract("queue_id")?;
        let last_event_id = resp.extract_optional::<i64>("last_event_id")?.unwrap_or(-1);

        let mut state = resp.into_payload()?;
        state.remove("queue_id");
        state.remove("last_event_id");

        debug!("registered event queue {queue_id} at event {last_event_id}");
        Ok(EventQueue {
            queue_id,
            last_event_id,
            state,
        })
    }

    /// Fetch events newer than `last_event_id` from a queue.
    ///
    /// With `dont_block` false the server holds the request open until an
    /// event arrives or its heartbeat fires, so the call runs under the
    /// client's extended timeout.
    pub async fn get(
        &self,
        queue_id: &str,
        last_event_id: i64,
        dont_block: bool,
    ) -> ZulipResult<Vec<Value>> {
        let params = Params::new()
            .with("queue_id", queue_id)
            .with("last_event_id", last_event_id.to_string())
            .with_bool("dont_block", dont_block);

        let resp = if dont_block {
            self.client.get("/events", params).await?
        } else {
            self.client.get_extended("/events", params).await?
        };
        resp.extract("events")
    }

    /// Delete a queue.
    pub async fn delete_queue(&self, queue_id: &str) -> ZulipResult<()> {
        let params = Params::new().with("queue_id", queue_id);
        let resp = self.client.delete("/events", params).await?;
        resp.expect_success()
    }
}

impl<'a> Events<'a> {
    /// Register a queue and wrap it in a poller that tracks the last event id.
    pub async fn poller(self, options: RegisterOptions) -> ZulipResult<EventPoller<'a>> {
        let queue = self.register(&options).await?;
        Ok(EventPoller {
            events: self,
            last_event_id: queue.last_event_id,
            queue,
            options,
        })
    }
}

/// A registered queue plus the position reached in it.
///
/// Each [`poll`](Self::poll) advances the last event id past the events it
/// returns. When the server has dropped the queue the poller registers a
/// fresh one with the same options and carries on from its start.
pub struct EventPoller<'a> {
    events: Events<'a>,
    options: RegisterOptions,
    queue: EventQueue,
    last_event_id: i64,
}

impl EventPoller<'_> {
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn last_event_id(&self) -> i64 {
        self.last_event_id
    }

    /// Fetch the next batch of events.
    ///
    /// Returns an empty batch after re-registering an expired queue.
    pub async fn poll(&mut self, dont_block: bool) -> ZulipResult<Vec<Value>> {
        let polled = self
            .events
            .get(&self.queue.queue_id, self.last_event_id, dont_block)
            .await;

        match polled {
            Ok(batch) => {
                if let Some(id) = last_event_id(&batch) {
                    self.last_event_id = self.last_event_id.max(id);
                }
                Ok(batch)
            }
            Err(e) if e.code() == Some(BAD_EVENT_QUEUE_ID) => {
                warn!("event queue {} expired, registering a new one", self.queue.queue_id);
                self.queue = self.events.register(&self.options).await?;
                self.last_event_id = self.queue.last_event_id;
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Long-poll until `shutdown` completes or a poll fails, handing each
    /// batch to `on_batch`. The queue is deleted on every exit path and the
    /// poll error, if any, is returned afterwards.
    pub async fn watch<S, F>(mut self, shutdown: S, mut on_batch: F) -> ZulipResult<()>
    where
        S: Future<Output = ()>,
        F: FnMut(&[Value]),
    {
        tokio::pin!(shutdown);

        let outcome = loop {
            let step = tokio::select! {
                polled = self.poll(false) => polled.map(Some),
                _ = &mut shutdown => Ok(None),
            };
            match step {
                Ok(Some(batch)) => on_batch(&batch),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        self.close().await;
        outcome
    }

    /// Delete the current queue. Failures are logged, not returned.
    pub async fn close(self) {
        match self.events.delete_queue(&self.queue.queue_id).await {
            Ok(()) => debug!("deleted event queue {}", self.queue.queue_id),
            Err(e) => warn!("failed to delete event queue {}: {e}", self.queue.queue_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_last_event_id() {
        let events = vec![
            json!({"id": 3, "type": "heartbeat"}),
            json!({"id": 7, "type": "message"}),
            json!({"type": "malformed"}),
        ];
        assert_eq!(last_event_id(&events), Some(7));
        assert_eq!(last_event_id(&[]), None);
    }

    #[test]
    fn test_event_queue_flattens_state() {
        let queue: EventQueue = serde_json::from_value(json!({
            "queue_id": "1517975029:0",
            "last_event_id": -1,
            "zulip_version": "8.0"
        }))
        .unwrap();
        assert_eq!(queue.queue_id, "1517975029:0");
        assert_eq!(queue.state["zulip_version"], "8.0");
    }
}
