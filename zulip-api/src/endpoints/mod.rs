//! API endpoint modules organized by category.
//!
//! Each module exposes a small handle borrowed from [`crate::ZulipClient`]
//! (`client.messages()`, `client.streams()`, ...) whose methods format
//! parameters, dispatch one request, and pull the promised field(s) out of
//! the response.

pub mod events;
pub mod messages;
pub mod server;
pub mod streams;
pub mod users;
