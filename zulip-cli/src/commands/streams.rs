//! Stream and subscription commands.

use clap::Subcommand;
use serde_json::{json, Value};

use zulip_api::{StreamFilter, StreamSpec};
use zulip_core::error::ZulipResult;

use super::{prompt, Context};
use crate::OutputFormat;

#[derive(Debug, Subcommand)]
pub enum StreamsAction {
    /// List streams visible to the user.
    List {
        /// Include public streams.
        #[arg(long)]
        public: Option<bool>,
        /// Include streams the user is subscribed to.
        #[arg(long)]
        subscribed: Option<bool>,
        /// Include the realm's default streams.
        #[arg(long)]
        default: Option<bool>,
        /// Include every active stream (administrators only).
        #[arg(long)]
        all_active: Option<bool>,
    },
    /// Look up a stream id by name.
    Id {
        /// Stream name.
        name: Option<String>,
    },
    /// List the user's subscriptions.
    Subscribed,
    /// Subscribe to streams, creating them if needed.
    Subscribe {
        /// Stream names.
        #[arg(value_delimiter = ',')]
        streams: Vec<String>,
        /// Subscribe these users instead of yourself.
        #[arg(short, long = "principal", value_delimiter = ',')]
        principals: Vec<String>,
        /// Description for newly created streams.
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Unsubscribe from streams.
    Unsubscribe {
        /// Stream names.
        #[arg(value_delimiter = ',')]
        streams: Vec<String>,
        /// Unsubscribe these users instead of yourself.
        #[arg(short, long = "principal", value_delimiter = ',')]
        principals: Vec<String>,
    },
}

pub async fn run(ctx: &Context, action: StreamsAction) -> ZulipResult<()> {
    let streams = ctx.client.streams();

    match action {
        StreamsAction::List {
            public,
            subscribed,
            default,
            all_active,
        } => {
            let defaults = StreamFilter::default();
            let filter = StreamFilter {
                include_public: ctx.flag("Include public", public, defaults.include_public)?,
                include_subscribed: ctx.flag(
                    "Include subscribed",
                    subscribed,
                    defaults.include_subscribed,
                )?,
                include_default: ctx.flag("Include default", default, defaults.include_default)?,
                include_all_active: ctx.flag(
                    "Include all active",
                    all_active,
                    defaults.include_all_active,
                )?,
            };
            let found = streams.get_all(filter).await?;
            print_streams(ctx, "streams", &found);
        }
        StreamsAction::Id { name } => {
            let name = prompt::text("Stream name", name)?;
            let id = streams.get_id(&name).await?;
            ctx.print_value("id", &json!(id));
        }
        StreamsAction::Subscribed => {
            let found = streams.get_subscribed().await?;
            print_streams(ctx, "subscriptions", &found);
        }
        StreamsAction::Subscribe {
            streams: names,
            principals,
            description,
        } => {
            let names = prompt::list("Stream names", names, false)?;
            let principals = ctx.optional_list("Principals", principals)?;
            let specs: Vec<StreamSpec> = names
                .into_iter()
                .map(|name| match &description {
                    Some(text) => StreamSpec::named(name).with_description(text),
                    None => StreamSpec::named(name),
                })
                .collect();

            let result = streams.subscribe(&specs, &principals).await?;
            match ctx.format {
                OutputFormat::Json => ctx.print_value("result", &serde_json::to_value(&result)?),
                OutputFormat::Text => {
                    print_by_user("subscribed", &result.subscribed);
                    print_by_user("already subscribed", &result.already_subscribed);
                    if !result.unauthorized.is_empty() {
                        println!("unauthorized: {}", result.unauthorized.join(", "));
                    }
                }
            }
        }
        StreamsAction::Unsubscribe {
            streams: names,
            principals,
        } => {
            let names = prompt::list("Stream names", names, false)?;
            let principals = ctx.optional_list("Principals", principals)?;

            let result = streams.unsubscribe(&names, &principals).await?;
            match ctx.format {
                OutputFormat::Json => ctx.print_value("result", &serde_json::to_value(&result)?),
                OutputFormat::Text => {
                    println!("removed: {}", result.removed.join(", "));
                    println!("not subscribed: {}", result.not_subscribed.join(", "));
                }
            }
        }
    }

    Ok(())
}

fn print_by_user(label: &str, by_user: &std::collections::BTreeMap<String, Vec<String>>) {
    for (user, names) in by_user {
        println!("{label}: {user}: {}", names.join(", "));
    }
}

fn print_streams(ctx: &Context, name: &str, found: &[Value]) {
    if ctx.format == OutputFormat::Json {
        ctx.print_value(name, &Value::Array(found.to_vec()));
        return;
    }
    if found.is_empty() {
        println!("No streams found.");
        return;
    }

    let mut table = super::new_table(vec!["ID", "Name", "Description"]);
    for stream in found {
        let id = stream
            .get("stream_id")
            .map(super::display_value)
            .unwrap_or_default();
        table.add_row(vec![
            id,
            super::str_field(stream, "name").to_string(),
            super::truncate(super::str_field(stream, "description"), 50),
        ]);
    }
    println!("{table}");
}
