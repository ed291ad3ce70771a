use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

use crate::constants::{LOG_DIRECTORY, LOG_FILE_PREFIX};

/// Logs to stdout and to a daily rolling file. The returned guard flushes the file writer on drop.
pub fn init_default_logger() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(LOG_DIRECTORY, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_filter(LevelFilter::INFO);

    // The file keeps this crate's debug output, dependencies stay at info.
    let file_layer = fmt::layer().with_ansi(false).with_writer(file_writer).with_filter(
        Targets::new()
            .with_target(env!("CARGO_CRATE_NAME"), Level::DEBUG)
            .with_default(Level::INFO),
    );

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}
