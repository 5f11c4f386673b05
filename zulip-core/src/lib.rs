//! Zulip Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the other Zulip crates:
//! - Server and application configuration (realm URL, credentials, logging)
//! - A unified error type separating transport and server-reported failures
//! - Structured logging with tracing
//! - Platform directory lookup
//! - Common constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::{AppConfig, ServerConfig};
pub use error::{ZulipError, ZulipResult};
pub use logging::init_logging;
pub use platform::Platform;
