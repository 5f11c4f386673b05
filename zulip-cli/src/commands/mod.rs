//! CLI command implementations.

pub mod events;
pub mod interactive;
pub mod messages;
pub mod prompt;
pub mod server;
pub mod streams;
pub mod users;

use std::path::Path;

use clap::Args;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use serde_json::Value;
use tracing::debug;

use zulip_api::ZulipClient;
use zulip_core::config::{AppConfig, ServerConfig};
use zulip_core::error::ZulipResult;

use crate::OutputFormat;

/// Connection flags shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Account email address (overrides ZULIP_EMAIL and the config file).
    #[arg(long, global = true)]
    pub email: Option<String>,

    /// API key (overrides ZULIP_API_KEY and the config file).
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Realm URL (overrides ZULIP_SITE and the config file).
    #[arg(long, global = true)]
    pub site: Option<String>,
}

/// What every command handler gets to work with.
pub struct Context {
    pub client: ZulipClient,
    pub format: OutputFormat,
    /// Set when the command was chosen at the prompt rather than on the
    /// command line; optional parameters are then asked for too.
    pub interactive: bool,
}

impl Context {
    /// An optional yes/no parameter: the flag if given, a prompt in
    /// interactive mode, otherwise `default`.
    pub fn flag(&self, label: &str, given: Option<bool>, default: bool) -> ZulipResult<bool> {
        match given {
            Some(value) => Ok(value),
            None if self.interactive => prompt::confirm(label, default),
            None => Ok(default),
        }
    }

    /// An optional list parameter, prompted for only in interactive mode.
    pub fn optional_list(&self, label: &str, given: Vec<String>) -> ZulipResult<Vec<String>> {
        if given.is_empty() && self.interactive {
            prompt::list(label, Vec::new(), true)
        } else {
            Ok(given)
        }
    }

    /// An optional text parameter, prompted for only in interactive mode.
    /// Empty input counts as absent.
    pub fn optional_text(&self, label: &str, given: Option<String>) -> ZulipResult<Option<String>> {
        match given {
            Some(value) => Ok(Some(value)),
            None if self.interactive => {
                let value = prompt::text_allow_empty(label, None)?;
                Ok(Some(value).filter(|v| !v.trim().is_empty()))
            }
            None => Ok(None),
        }
    }

    /// Print a named result: `name: value` as text, or the value as JSON.
    pub fn print_value(&self, name: &str, value: &Value) {
        match self.format {
            OutputFormat::Json => println!("{}", to_pretty_json(value)),
            OutputFormat::Text => println!("{name}: {}", display_value(value)),
        }
    }

    /// Report success for endpoints that return nothing.
    pub fn print_done(&self) {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::json!({"result": "success"})),
            OutputFormat::Text => println!("Success."),
        }
    }
}

/// Load configuration from `path`, or from the default location if it
/// exists, then apply environment overrides.
pub fn load_config(path: Option<&str>) -> ZulipResult<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from_file(Path::new(path))?,
        None => AppConfig::load_default()?,
    };
    Ok(config.with_env_overrides())
}

/// Work out the server settings for this run.
///
/// Precedence is flag > environment > config file > prompt. Email and API
/// key are only asked for when `needs_credentials` is set.
pub fn resolve_server(
    config: &AppConfig,
    args: &ConnectionArgs,
    needs_credentials: bool,
) -> ZulipResult<ServerConfig> {
    let mut server = config.server.clone();

    if let Some(site) = &args.site {
        server.realm_url = AppConfig::sanitize_realm_url(site);
    }
    if let Some(email) = &args.email {
        server.email = email.clone();
    }
    if let Some(key) = &args.api_key {
        server.api_key = key.clone();
    }

    if needs_credentials {
        if server.email.trim().is_empty() {
            server.email = prompt::text("Email address", None)?;
        }
        if server.api_key.trim().is_empty() {
            server.api_key = prompt::secret("API key", None)?;
        }
    }
    if server.realm_url.is_empty() {
        let site = prompt::text("Realm URL", None)?;
        server.realm_url = AppConfig::sanitize_realm_url(&site);
    }

    if needs_credentials {
        server.validate()?;
    }
    debug!("using realm {} as {}", server.realm_url, server.email);
    Ok(server)
}

/// A table in the CLI's house style.
pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Pretty JSON for `--format json`.
pub fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Strings print bare; everything else prints as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A string field of a JSON record, or "-".
pub fn str_field<'a>(record: &'a Value, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("-")
}

/// Truncate a string to at most `max_len` characters, appending an
/// ellipsis if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_len {
        s
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}
