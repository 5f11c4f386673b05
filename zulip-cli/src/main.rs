//! Zulip CLI - command-line interface for a Zulip realm.
//!
//! Wraps the endpoint groups of `zulip-api` as subcommands. Any parameter
//! not given on the command line is asked for interactively, and running
//! without a subcommand asks for a dotted command name such as
//! `messages.send` first.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use tracing::{debug, info};

use zulip_api::ZulipClient;
use zulip_core::error::ZulipResult;
use zulip_core::logging;

use commands::{ConnectionArgs, Context};

/// Zulip - talk to a Zulip realm from the terminal.
#[derive(Parser)]
#[command(
    name = "zulip",
    version,
    about = "Zulip REST API client",
    long_about = "A command-line client for the Zulip REST API.\n\
                  Send and fetch messages, manage stream subscriptions and users,\n\
                  and poll event queues on any Zulip realm."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send, fetch, render and edit messages.
    Messages {
        #[command(subcommand)]
        action: commands::messages::MessagesAction,
    },
    /// List streams and manage subscriptions.
    Streams {
        #[command(subcommand)]
        action: commands::streams::StreamsAction,
    },
    /// List, inspect and create users.
    Users {
        #[command(subcommand)]
        action: commands::users::UsersAction,
    },
    /// Register, poll and delete event queues.
    Events {
        #[command(subcommand)]
        action: commands::events::EventsAction,
    },
    /// Realm-level information.
    Server {
        #[command(subcommand)]
        action: commands::server::ServerAction,
    },
}

impl Commands {
    /// Whether the command needs an email address and API key.
    fn needs_credentials(&self) -> bool {
        !matches!(self, Commands::Server { .. })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = e.to_string();
            eprintln!(
                "{} {}.",
                style("Error:").red().bold(),
                message.trim_end_matches('.')
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ZulipResult<()> {
    let config = commands::load_config(cli.config.as_deref())?;

    // Initialize logging
    let mut log_config = config.logging.clone();
    if cli.verbose {
        log_config.level = "debug".into();
    }
    let _guard = logging::init_or_console(
        &log_config.level,
        config.effective_log_dir(),
        log_config.json_output,
    );

    info!("Zulip CLI v{}", zulip_core::constants::APP_VERSION);

    let interactive = cli.command.is_none();
    let command = match cli.command {
        Some(command) => command,
        None => commands::interactive::choose_command()?,
    };
    debug!("running {command:?}");

    let server = commands::resolve_server(&config, &cli.connection, command.needs_credentials())?;
    let ctx = Context {
        client: ZulipClient::new(server)?,
        format: cli.format,
        interactive,
    };

    // Dispatch to command handlers
    match command {
        Commands::Messages { action } => commands::messages::run(&ctx, action).await,
        Commands::Streams { action } => commands::streams::run(&ctx, action).await,
        Commands::Users { action } => commands::users::run(&ctx, action).await,
        Commands::Events { action } => commands::events::run(&ctx, action).await,
        Commands::Server { action } => commands::server::run(&ctx, action).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "zulip",
            "streams",
            "id",
            "general",
            "--format",
            "json",
            "--site",
            "chat.example.com",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.connection.site.as_deref(), Some("chat.example.com"));
        assert!(matches!(cli.command, Some(Commands::Streams { .. })));
    }

    #[test]
    fn test_no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["zulip", "--email", "iago@zulip.com"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.connection.email.as_deref(), Some("iago@zulip.com"));
    }

    #[test]
    fn test_server_commands_need_no_credentials() {
        let cli = Cli::try_parse_from(["zulip", "server", "settings"]).unwrap();
        assert!(!cli.command.unwrap().needs_credentials());

        let cli = Cli::try_parse_from(["zulip", "users", "me"]).unwrap();
        assert!(cli.command.unwrap().needs_credentials());
    }
}
