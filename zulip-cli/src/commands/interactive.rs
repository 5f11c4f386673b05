//! Interactive mode: pick a command by its dotted name.

use zulip_core::error::{ZulipError, ZulipResult};

use super::events::{EventsAction, QueueArgs};
use super::messages::MessagesAction;
use super::prompt;
use super::server::ServerAction;
use super::streams::StreamsAction;
use super::users::UsersAction;
use crate::Commands;

/// Every name accepted at the prompt.
pub const COMMAND_NAMES: &[&str] = &[
    "messages.send",
    "messages.get",
    "messages.render",
    "messages.update",
    "streams.getAll",
    "streams.getID",
    "streams.getSubscribed",
    "streams.subscribe",
    "streams.unsubscribe",
    "users.getAll",
    "users.getCurrent",
    "users.create",
    "events.register",
    "events.get",
    "events.deleteQueue",
    "events.watch",
    "server.settings",
];

/// Ask which command to run.
pub(crate) fn choose_command() -> ZulipResult<Commands> {
    println!("Which function would you like to run?");
    println!("(possible options: {})", COMMAND_NAMES.join(", "));
    let name = prompt::text("Command", None)?;
    parse_command(&name)
}

/// Map a dotted name to a command with every parameter left open, so the
/// handler prompts for each one.
pub(crate) fn parse_command(name: &str) -> ZulipResult<Commands> {
    let command = match name.trim() {
        "messages.send" => Commands::Messages {
            action: MessagesAction::Send {
                message_type: None,
                to: None,
                subject: None,
                content: None,
            },
        },
        "messages.get" => Commands::Messages {
            action: MessagesAction::Get {
                stream: None,
                topic: None,
                anchor: None,
                before: None,
                after: None,
            },
        },
        "messages.render" => Commands::Messages {
            action: MessagesAction::Render { content: None },
        },
        "messages.update" => Commands::Messages {
            action: MessagesAction::Update {
                message_id: None,
                content: None,
            },
        },
        "streams.getAll" => Commands::Streams {
            action: StreamsAction::List {
                public: None,
                subscribed: None,
                default: None,
                all_active: None,
            },
        },
        "streams.getID" => Commands::Streams {
            action: StreamsAction::Id { name: None },
        },
        "streams.getSubscribed" => Commands::Streams {
            action: StreamsAction::Subscribed,
        },
        "streams.subscribe" => Commands::Streams {
            action: StreamsAction::Subscribe {
                streams: Vec::new(),
                principals: Vec::new(),
                description: None,
            },
        },
        "streams.unsubscribe" => Commands::Streams {
            action: StreamsAction::Unsubscribe {
                streams: Vec::new(),
                principals: Vec::new(),
            },
        },
        "users.getAll" => Commands::Users {
            action: UsersAction::List {
                client_gravatar: None,
            },
        },
        "users.getCurrent" => Commands::Users {
            action: UsersAction::Me {
                client_gravatar: None,
            },
        },
        "users.create" => Commands::Users {
            action: UsersAction::Create {
                new_email: None,
                password: None,
                full_name: None,
                short_name: None,
            },
        },
        "events.register" => Commands::Events {
            action: EventsAction::Register {
                queue: QueueArgs::default(),
            },
        },
        "events.get" => Commands::Events {
            action: EventsAction::Get {
                queue_id: None,
                last_event_id: None,
                dont_block: None,
            },
        },
        "events.deleteQueue" => Commands::Events {
            action: EventsAction::DeleteQueue { queue_id: None },
        },
        "events.watch" => Commands::Events {
            action: EventsAction::Watch {
                queue: QueueArgs::default(),
            },
        },
        "server.settings" => Commands::Server {
            action: ServerAction::Settings,
        },
        "" => return Err(ZulipError::InvalidInput("no command entered".into())),
        _ => return Err(ZulipError::InvalidInput("incorrect command".into())),
    };
    Ok(command)
}
