//! Configuration management.
//!
//! Handles loading, saving, and accessing configuration: the realm URL and
//! credentials used by the API client, plus logging preferences.
//! Configuration is persisted as TOML on disk and can be overridden through
//! the `ZULIP_EMAIL`, `ZULIP_API_KEY` and `ZULIP_SITE` environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{self, API_VERSION, CONFIG_FILE_NAME};
use crate::error::{ZulipError, ZulipResult};
use crate::platform::Platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server connection settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server connection configuration.
///
/// The API client takes ownership of one of these and never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Account email address, used as the basic-auth username.
    #[serde(default)]
    pub email: String,

    /// API key, used as the basic-auth secret.
    #[serde(default, alias = "key")]
    pub api_key: String,

    /// Realm URL (e.g., "https://chat.example.com").
    #[serde(default, alias = "site")]
    pub realm_url: String,

    /// API request timeout in milliseconds.
    #[serde(default = "default_api_timeout")]
    pub api_timeout_ms: u64,

    /// Whether to accept self-signed TLS certificates from the realm.
    #[serde(default, alias = "insecure")]
    pub accept_self_signed_certs: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level directive: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

// Default value functions for serde

fn default_api_timeout() -> u64 {
    constants::DEFAULT_API_TIMEOUT_MS
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            api_key: String::new(),
            realm_url: String::new(),
            api_timeout_ms: default_api_timeout(),
            accept_self_signed_certs: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl ServerConfig {
    /// Build a server configuration from credentials and a realm URL.
    pub fn new(
        email: impl Into<String>,
        api_key: impl Into<String>,
        realm_url: impl AsRef<str>,
    ) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
            realm_url: AppConfig::sanitize_realm_url(realm_url.as_ref()),
            ..Self::default()
        }
    }

    /// The API root: `<realm>/api/v1`.
    pub fn api_url(&self) -> String {
        let realm = AppConfig::sanitize_realm_url(&self.realm_url);
        format!("{realm}/api/{API_VERSION}")
    }

    /// Check that every field needed to talk to the realm is present.
    pub fn validate(&self) -> ZulipResult<()> {
        if self.realm_url.trim().is_empty() {
            return Err(ZulipError::MissingConfig("realm URL".into()));
        }
        if self.email.trim().is_empty() {
            return Err(ZulipError::MissingConfig("email address".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ZulipError::MissingConfig("API key".into()));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> ZulipResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> ZulipResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents)?;
        config.server.realm_url = Self::sanitize_realm_url(&config.server.realm_url);
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> ZulipResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ZulipError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> ZulipResult<PathBuf> {
        let config_dir = Platform::config_dir()?;
        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> ZulipResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Platform::log_dir()
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Check whether the server connection is configured.
    pub fn is_server_configured(&self) -> bool {
        self.server.validate().is_ok()
    }

    /// Apply `ZULIP_EMAIL`, `ZULIP_API_KEY` and `ZULIP_SITE` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(email) = get(constants::env::EMAIL) {
            self.server.email = email;
        }
        if let Some(key) = get(constants::env::API_KEY) {
            self.server.api_key = key;
        }
        if let Some(site) = get(constants::env::SITE) {
            self.server.realm_url = Self::sanitize_realm_url(&site);
        }
        self
    }

    /// Sanitize and normalize a realm URL.
    ///
    /// Strips whitespace and quotes, defaults the scheme to https (plain
    /// http only for localhost and bare IPv4 hosts), and drops trailing
    /// slashes and a trailing `/api` or `/api/v1` suffix.
    pub fn sanitize_realm_url(address: &str) -> String {
        let trimmed = address.trim().trim_matches('"').trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else if is_local_host(trimmed) {
            format!("http://{trimmed}")
        } else {
            format!("https://{trimmed}")
        };

        let mut url = with_scheme.trim_end_matches('/');
        for suffix in [format!("/api/{API_VERSION}"), "/api".to_string()] {
            if let Some(stripped) = url.strip_suffix(suffix.as_str()) {
                url = stripped.trim_end_matches('/');
                break;
            }
        }
        url.to_string()
    }
}

/// Whether a scheme-less address points at localhost or a bare IPv4 host.
fn is_local_host(address: &str) -> bool {
    let host = address.split(['/', ':']).next().unwrap_or_default();
    host == "localhost" || host.parse::<std::net::Ipv4Addr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.api_timeout_ms, 30_000);
        assert_eq!(config.logging.level, "warn");
        assert!(!config.is_server_configured());
    }

    #[test]
    fn test_sanitize_realm_url() {
        assert_eq!(
            AppConfig::sanitize_realm_url("chat.example.com"),
            "https://chat.example.com"
        );
        assert_eq!(
            AppConfig::sanitize_realm_url("http://192.168.1.100:9991/"),
            "http://192.168.1.100:9991"
        );
        assert_eq!(
            AppConfig::sanitize_realm_url("  \"https://example.zulipchat.com/\"  "),
            "https://example.zulipchat.com"
        );
        assert_eq!(
            AppConfig::sanitize_realm_url("localhost:9991"),
            "http://localhost:9991"
        );
        assert_eq!(
            AppConfig::sanitize_realm_url("https://example.zulipchat.com/api/v1/"),
            "https://example.zulipchat.com"
        );
        assert_eq!(AppConfig::sanitize_realm_url("   "), "");
    }

    #[test]
    fn test_api_url() {
        let config = ServerConfig::new("bot@example.com", "abc", "https://chat.example.com/");
        assert_eq!(config.realm_url, "https://chat.example.com");
        assert_eq!(config.api_url(), "https://chat.example.com/api/v1");
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let mut config = ServerConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ZulipError::MissingConfig(ref f)) if f == "realm URL"
        ));
        config.realm_url = "https://chat.example.com".into();
        config.email = "bot@example.com".into();
        assert!(matches!(
            config.validate(),
            Err(ZulipError::MissingConfig(ref f)) if f == "API key"
        ));
        config.api_key = "secret".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ZULIP_EMAIL", "env@example.com"),
            ("ZULIP_API_KEY", ""),
            ("ZULIP_SITE", "env.example.com"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.server.api_key = "from-file".into();
        let config = config.with_overrides_from(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.server.email, "env@example.com");
        assert_eq!(config.server.api_key, "from-file");
        assert_eq!(config.server.realm_url, "https://env.example.com");
    }

    #[test]
    fn test_roundtrip_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.server = ServerConfig::new("bot@example.com", "secret", "chat.example.com");
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.server, config.server);
        assert!(loaded.is_server_configured());
    }

    #[test]
    fn test_zuliprc_style_keys() {
        let toml = r#"
            [server]
            email = "bot@example.com"
            key = "secret"
            site = "chat.example.com/"
            insecure = true
        "#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, toml).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.server.api_key, "secret");
        assert_eq!(loaded.server.realm_url, "https://chat.example.com");
        assert!(loaded.server.accept_self_signed_certs);
        assert_eq!(loaded.server.api_timeout_ms, 30_000);
    }
}
