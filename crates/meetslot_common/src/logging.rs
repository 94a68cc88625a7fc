//! Logging setup shared by all binaries.
//!
//! Installs a `tracing` subscriber with a stdout `fmt` layer and, when a log
//! directory is configured, a daily rolling file layer.

use meetslot_config::LoggingConfig;
use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize from the `[logging]` config section.
///
/// Unknown level names fall back to INFO.
pub fn init_from_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = config
        .level
        .as_deref()
        .and_then(|l| l.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    init_with_level(level, config)
}

/// Initialize the tracing subscriber with a specific log level.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for as long as the process logs. `None` means no file layer was set up.
pub fn init_with_level(level: Level, config: &LoggingConfig) -> Option<WorkerGuard> {
    let mut filter = EnvFilter::from_default_env();
    for target in ["meetslot", "tower_http"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(dir) => {
            let prefix = config.file_prefix.as_deref().unwrap_or("meetslot.log");
            let appender = tracing_appender::rolling::daily(dir, prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // try_init: a global subscriber may already be set (tests, embedding)
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(file_layer)
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
    guard
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    error!("{}: {}", context, error);
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}
