//! Structured logging setup using the `tracing` ecosystem.
//!
//! Console output goes to stderr so it never mixes with command results on
//! stdout. File output rotates daily and can be written as JSON.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants::LOG_FILE_NAME;
use crate::error::{ZulipError, ZulipResult};

/// Initialize the global tracing subscriber.
///
/// `level` is an `EnvFilter` directive ("warn", "zulip_api=debug", ...);
/// `RUST_LOG` takes precedence when set. Console output is compact and
/// goes to stderr. The file in `log_dir` rotates daily and is written as
/// JSON lines when `json_output` is set.
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> ZulipResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true)
        .without_time()
        .compact();

    // Exactly one of these is Some.
    let (json_layer, text_layer) = if json_output {
        let layer = fmt::layer()
            .with_writer(non_blocking)
            .json()
            .with_current_span(false)
            .with_file(true)
            .with_line_number(true);
        (Some(layer), None)
    } else {
        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true);
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| ZulipError::Internal(format!("failed to install logger: {e}")))?;

    tracing::debug!("logging initialized at level={level}, dir={}", log_dir.display());

    Ok(LogGuard { _guard: guard })
}

/// Start logging to `log_dir` and the console, or to the console alone when
/// the directory cannot be resolved or created. `None` means no file is
/// being written.
pub fn init_or_console(
    level: &str,
    log_dir: ZulipResult<PathBuf>,
    json_output: bool,
) -> Option<LogGuard> {
    match log_dir.and_then(|dir| init_logging(level, &dir, json_output)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            init_console_logging(level);
            tracing::warn!("file logging disabled: {e}");
            None
        }
    }
}

/// Guard that keeps the non-blocking log writer alive.
/// Drop this to flush and close the log file.
pub struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Initialize a minimal console-only logger for testing or simple CLI usage.
pub fn init_console_logging(level: &str) {
    let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).compact())
        .try_init();
}
