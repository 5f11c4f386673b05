//! Zulip API - HTTP client for the Zulip server REST API.
//!
//! The crate is two small pieces plus a set of endpoint wrappers:
//! - [`ZulipClient::dispatch`] sends one HTTP request (verb, URL, form or
//!   query parameters, optional basic auth) and yields the decoded JSON body.
//! - [`ApiResponse`] pulls the top-level object or a named field out of that
//!   body and turns absence into a domain error.
//! - `client.messages()`, `client.streams()`, `client.users()` and
//!   `client.events()` wrap the individual endpoints.

pub mod client;
pub mod endpoints;
pub mod narrow;
pub mod request;
pub mod response;

// Re-export key types
pub use client::ZulipClient;
pub use endpoints::events::{EventPoller, EventQueue, Events, RegisterOptions};
pub use endpoints::messages::{Anchor, MessageType, Messages};
pub use endpoints::streams::{StreamFilter, StreamSpec, Streams, SubscribeResult, UnsubscribeResult};
pub use endpoints::users::{NewUser, Users};
pub use narrow::Narrow;
pub use request::{ApiRequest, Credentials, Params};
pub use response::ApiResponse;
