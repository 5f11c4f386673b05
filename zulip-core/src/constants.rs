//! Application-wide constants.

/// Application name, used for platform directories and log file names.
pub const APP_NAME: &str = "zulip";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// REST API version prefix.
pub const API_VERSION: &str = "v1";

/// Default API request timeout in milliseconds.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;

/// Multiplier applied to the base timeout for long-running requests.
pub const EXTENDED_TIMEOUT_MULTIPLIER: u32 = 3;

/// Floor for the extended timeout, in seconds. A blocking event poll is held
/// open until the server's heartbeat, which can take close to a minute.
pub const LONG_POLL_TIMEOUT_SECS: u64 = 90;

/// Connect timeout in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name prefix of the rotated log files.
pub const LOG_FILE_NAME: &str = "zulip.log";

/// Environment variables that override the configured server settings.
pub mod env {
    pub const EMAIL: &str = "ZULIP_EMAIL";
    pub const API_KEY: &str = "ZULIP_API_KEY";
    pub const SITE: &str = "ZULIP_SITE";
}

/// `User-Agent` header sent with every request, e.g. `ZulipRust/0.1.0 (Linux)`.
pub fn user_agent() -> String {
    format!("ZulipRust/{APP_VERSION} ({})", crate::platform::Platform::current())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_version() {
        let ua = user_agent();
        assert!(ua.starts_with("ZulipRust/"));
        assert!(ua.contains(APP_VERSION));
        assert!(ua.ends_with(')'));
    }
}
