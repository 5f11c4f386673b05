//! Server commands.

use clap::Subcommand;
use console::style;
use serde_json::Value;

use zulip_core::error::ZulipResult;

use super::Context;
use crate::OutputFormat;

/// Settings worth showing in text mode, in display order.
const SUMMARY_KEYS: &[(&str, &str)] = &[
    ("realm_name", "Realm"),
    ("realm_uri", "URL"),
    ("zulip_version", "Version"),
    ("zulip_feature_level", "Feature level"),
    ("push_notifications_enabled", "Push notifications"),
    ("require_email_format_usernames", "Email usernames"),
];

#[derive(Debug, Subcommand)]
pub enum ServerAction {
    /// Show the realm's public settings. Needs no credentials.
    Settings,
}

pub async fn run(ctx: &Context, action: ServerAction) -> ZulipResult<()> {
    match action {
        ServerAction::Settings => {
            let settings = ctx.client.server_settings().await?;

            match ctx.format {
                OutputFormat::Json => ctx.print_value("settings", &Value::Object(settings)),
                OutputFormat::Text => {
                    println!("{}", style("Server Settings").bold().underlined());
                    for (key, label) in SUMMARY_KEYS {
                        if let Some(value) = settings.get(*key) {
                            println!("  {:<20} {}", format!("{label}:"), super::display_value(value));
                        }
                    }
                    if let Some(Value::Object(methods)) = settings.get("authentication_methods") {
                        let enabled: Vec<&str> = methods
                            .iter()
                            .filter(|(_, on)| on.as_bool() == Some(true))
                            .map(|(name, _)| name.as_str())
                            .collect();
                        println!("  {:<20} {}", "Auth methods:", enabled.join(", "));
                    }
                }
            }
        }
    }

    Ok(())
}
