//! Message commands.

use chrono::{DateTime, Local};
use clap::Subcommand;
use serde_json::{json, Value};

use zulip_api::{Anchor, MessageType, Narrow};
use zulip_core::error::ZulipResult;

use super::{prompt, Context};
use crate::OutputFormat;

#[derive(Debug, Subcommand)]
pub enum MessagesAction {
    /// Send a stream or private message.
    Send {
        /// Message type: stream or private.
        #[arg(short = 't', long = "type")]
        message_type: Option<MessageType>,
        /// Stream name, or comma-separated emails for a private message.
        #[arg(long)]
        to: Option<String>,
        /// Topic (stream messages only).
        #[arg(short, long)]
        subject: Option<String>,
        /// Message content (Zulip markdown).
        #[arg(short = 'm', long)]
        content: Option<String>,
    },
    /// Fetch messages from a stream.
    Get {
        /// Stream to read from; empty means all messages.
        #[arg(short, long)]
        stream: Option<String>,
        /// Narrow further to one topic.
        #[arg(long)]
        topic: Option<String>,
        /// Message id, or newest, oldest, first_unread.
        #[arg(short, long)]
        anchor: Option<Anchor>,
        /// Number of messages before the anchor.
        #[arg(short = 'b', long)]
        before: Option<u32>,
        /// Number of messages after the anchor.
        #[arg(short = 'A', long)]
        after: Option<u32>,
    },
    /// Render markdown to HTML without sending it.
    Render {
        /// Content to render.
        content: Option<String>,
    },
    /// Replace the content of a message.
    Update {
        /// Message id.
        message_id: Option<u64>,
        /// New content.
        #[arg(short = 'm', long)]
        content: Option<String>,
    },
}

pub async fn run(ctx: &Context, action: MessagesAction) -> ZulipResult<()> {
    let messages = ctx.client.messages();

    match action {
        MessagesAction::Send {
            message_type,
            to,
            subject,
            content,
        } => {
            let message_type = prompt::parsed("Message type (stream/private)", message_type)?;
            let to = prompt::text("To", to)?;
            let subject = match message_type {
                MessageType::Stream => prompt::text("Subject", subject)?,
                MessageType::Private => subject.unwrap_or_default(),
            };
            let content = prompt::text("Content", content)?;

            let id = messages.send(message_type, &to, &subject, &content).await?;
            ctx.print_value("id", &json!(id));
        }
        MessagesAction::Get {
            stream,
            topic,
            anchor,
            before,
            after,
        } => {
            let stream = prompt::text_allow_empty("Stream", stream)?;
            let anchor = prompt::parsed("Anchor", anchor)?;
            let before = prompt::parsed("Amount before", before)?;
            let after = prompt::parsed("Amount after", after)?;

            let mut narrow = Narrow::new();
            if !stream.trim().is_empty() {
                narrow = narrow.stream(stream.trim());
            }
            if let Some(topic) = ctx.optional_text("Topic", topic)? {
                narrow = narrow.topic(topic);
            }

            let found = messages.get(&narrow, anchor, before, after).await?;
            print_messages(ctx, &found);
        }
        MessagesAction::Render { content } => {
            let content = prompt::text("Content", content)?;
            let rendered = messages.render(&content).await?;
            ctx.print_value("rendered", &json!(rendered));
        }
        MessagesAction::Update {
            message_id,
            content,
        } => {
            let message_id = prompt::parsed("Message ID", message_id)?;
            let content = prompt::text("Content", content)?;
            messages.update(message_id, &content).await?;
            ctx.print_done();
        }
    }

    Ok(())
}

fn print_messages(ctx: &Context, found: &[Value]) {
    if ctx.format == OutputFormat::Json {
        ctx.print_value("messages", &Value::Array(found.to_vec()));
        return;
    }
    if found.is_empty() {
        println!("No messages found.");
        return;
    }

    let mut table = super::new_table(vec!["ID", "Time", "From", "Where", "Content"]);
    for message in found {
        let id = message.get("id").map(super::display_value).unwrap_or_default();
        let time = message
            .get("timestamp")
            .and_then(Value::as_i64)
            .map(format_timestamp)
            .unwrap_or_else(|| "-".into());
        table.add_row(vec![
            id,
            time,
            super::str_field(message, "sender_email").to_string(),
            location(message),
            super::truncate(super::str_field(message, "content"), 50),
        ]);
    }
    println!("{table}");
    println!("\n{} message(s)", found.len());
}

/// `stream > topic` for stream messages, the recipients otherwise.
fn location(message: &Value) -> String {
    match message.get("display_recipient") {
        Some(Value::String(stream)) => {
            format!("{stream} > {}", super::str_field(message, "subject"))
        }
        Some(Value::Array(recipients)) => recipients
            .iter()
            .map(|r| super::str_field(r, "email"))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "-".into(),
    }
}

fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| secs.to_string())
}
