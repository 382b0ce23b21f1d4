//! Tracing subscriber setup.
//!
//! Filter resolution: `TASKDECK_LOG`, then `[log] level`, then `warn`.
//! Logs go to stderr; `[log] file = true` adds a daily file under
//! `${TASKDECK_HOME}/logs`.

use std::io::IsTerminal;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogConfig, paths};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "TASKDECK_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";
const LOG_FILE_PREFIX: &str = "taskdeck.log";

/// Installs the global subscriber.
///
/// Returns the file writer guard when file logging is on; keep it alive
/// until exit so buffered lines are flushed. Calling this twice is a no-op.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    init_with_dir(config, &paths::logs_dir())
}

fn init_with_dir(config: &LogConfig, logs_dir: &Path) -> Option<WorkerGuard> {
    let directive = filter_directive(config, std::env::var(LOG_ENV_VAR).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("Ignoring invalid log filter '{directive}': {e}");
        EnvFilter::new(DEFAULT_DIRECTIVE)
    });

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false);

    let appender = if config.file {
        match RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .build(logs_dir)
        {
            Ok(appender) => Some(appender),
            Err(e) => {
                eprintln!("File logging disabled ({}): {e}", logs_dir.display());
                None
            }
        }
    } else {
        None
    };
    let (file_layer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    if tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        return None;
    }

    tracing::debug!(%directive, file = config.file, "logging initialized");
    guard
}

/// Picks the filter directive: env, then config, then default.
fn filter_directive(config: &LogConfig, env: Option<String>) -> String {
    env.filter(|v| !v.trim().is_empty())
        .or_else(|| config.level.clone().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}
