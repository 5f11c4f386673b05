//! Event queue commands.

use clap::Subcommand;
use console::style;
use serde_json::Value;
use tracing::warn;

use zulip_api::{Narrow, RegisterOptions};
use zulip_core::error::ZulipResult;

use super::{prompt, Context};
use crate::OutputFormat;

#[derive(Debug, Subcommand)]
pub enum EventsAction {
    /// Register a new event queue.
    Register {
        #[command(flatten)]
        queue: QueueArgs,
    },
    /// Fetch events from a queue.
    Get {
        /// Queue id returned by register.
        #[arg(short, long)]
        queue_id: Option<String>,
        /// Last event id already seen (-1 for none).
        #[arg(short, long, allow_hyphen_values = true)]
        last_event_id: Option<i64>,
        /// Return immediately instead of waiting for an event.
        #[arg(long)]
        dont_block: Option<bool>,
    },
    /// Delete an event queue.
    DeleteQueue {
        /// Queue id returned by register.
        queue_id: Option<String>,
    },
    /// Register a queue and print events as they arrive (Ctrl+C to stop).
    Watch {
        #[command(flatten)]
        queue: QueueArgs,
    },
}

/// Registration options shared by `register` and `watch`.
#[derive(Debug, Default, clap::Args)]
pub struct QueueArgs {
    /// Render message content as HTML.
    #[arg(long)]
    apply_markdown: Option<bool>,
    /// Let the client compute gravatar URLs.
    #[arg(long)]
    client_gravatar: Option<bool>,
    /// Comma-separated event types; an empty string asks for none.
    #[arg(short, long)]
    event_types: Option<String>,
    /// Receive events for every public stream.
    #[arg(long)]
    all_public_streams: Option<bool>,
    /// Include subscriber lists in stream events.
    #[arg(long)]
    include_subscribers: Option<bool>,
    /// Only receive events for this stream.
    #[arg(short, long)]
    stream: Option<String>,
}

impl QueueArgs {
    fn into_options(self, ctx: &Context) -> ZulipResult<RegisterOptions> {
        let defaults = RegisterOptions::default();

        let event_types = match self.event_types {
            Some(raw) => Some(prompt::split_list(&raw)),
            None => ctx
                .optional_text("Event types (comma-separated, empty for all)", None)?
                .map(|raw| prompt::split_list(&raw)),
        };
        let narrow = match ctx.optional_text("Stream name", self.stream)? {
            Some(stream) => Narrow::new().stream(stream),
            None => Narrow::new(),
        };

        Ok(RegisterOptions {
            apply_markdown: ctx.flag("Apply markdown", self.apply_markdown, defaults.apply_markdown)?,
            client_gravatar: ctx.flag(
                "Client gravatar",
                self.client_gravatar,
                defaults.client_gravatar,
            )?,
            event_types,
            all_public_streams: ctx.flag(
                "All public streams",
                self.all_public_streams,
                defaults.all_public_streams,
            )?,
            include_subscribers: ctx.flag(
                "Include subscribers",
                self.include_subscribers,
                defaults.include_subscribers,
            )?,
            narrow,
        })
    }
}

pub async fn run(ctx: &Context, action: EventsAction) -> ZulipResult<()> {
    let events = ctx.client.events();

    match action {
        EventsAction::Register { queue } => {
            let options = queue.into_options(ctx)?;
            let registered = events.register(&options).await?;
            match ctx.format {
                OutputFormat::Json => ctx.print_value("queue", &serde_json::to_value(&registered)?),
                OutputFormat::Text => {
                    println!("queue_id: {}", registered.queue_id);
                    println!("last_event_id: {}", registered.last_event_id);
                }
            }
        }
        EventsAction::Get {
            queue_id,
            last_event_id,
            dont_block,
        } => {
            let queue_id = prompt::text("Queue ID", queue_id)?;
            let last_event_id = prompt::parsed("Last event ID", last_event_id)?;
            let dont_block = ctx.flag("Don't block", dont_block, false)?;

            let found = events.get(&queue_id, last_event_id, dont_block).await?;
            ctx.print_value("events", &Value::Array(found));
        }
        EventsAction::DeleteQueue { queue_id } => {
            let queue_id = prompt::text("Queue ID", queue_id)?;
            events.delete_queue(&queue_id).await?;
            ctx.print_done();
        }
        EventsAction::Watch { queue } => {
            let options = queue.into_options(ctx)?;
            watch(ctx, options).await?;
        }
    }

    Ok(())
}

/// Poll a fresh queue until Ctrl+C, re-registering if the server drops it.
async fn watch(ctx: &Context, options: RegisterOptions) -> ZulipResult<()> {
    let poller = ctx.client.events().poller(options).await?;

    eprintln!(
        "  {} Registered queue {}. Listening for events... (Ctrl+C to stop)",
        style("OK").green().bold(),
        poller.queue().queue_id
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        eprintln!("\n  Stopping...");
    };

    poller
        .watch(shutdown, |batch| {
            for event in batch {
                print_event(ctx, event);
            }
        })
        .await
}

fn print_event(ctx: &Context, event: &Value) {
    match ctx.format {
        OutputFormat::Json => println!("{event}"),
        OutputFormat::Text => {
            let kind = super::str_field(event, "type");
            if kind == "heartbeat" {
                return;
            }
            println!(
                "  {} {}",
                style(format!("[{kind}]")).cyan(),
                summarize_event(event)
            );
        }
    }
}

/// One-line description of an event.
fn summarize_event(event: &Value) -> String {
    match super::str_field(event, "type") {
        "message" => {
            let message = event.get("message").unwrap_or(&Value::Null);
            format!(
                "{}: {}",
                super::str_field(message, "sender_email"),
                super::truncate(super::str_field(message, "content"), 60)
            )
        }
        _ => {
            let mut rest = event.clone();
            if let Some(map) = rest.as_object_mut() {
                map.remove("type");
                map.remove("id");
            }
            super::truncate(&rest.to_string(), 80)
        }
    }
}
