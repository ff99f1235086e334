use crate::config::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "reelcrawl.log";

/// Filter used when `RUST_LOG` is unset
#[must_use]
pub fn default_filter(settings: &LoggingSettings, verbose: bool) -> String {
    let level = if verbose { "debug" } else { settings.level.as_str() };
    format!("reelcrawl={level}")
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer and must live until exit.
pub fn init(settings: &LoggingSettings, verbose: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(settings, verbose)));

    let (file_layer, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    guard
}
