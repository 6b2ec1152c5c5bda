use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use dispatch_lib::Config;

/// Builds the process-wide `tracing` subscriber: an hourly-rotated file
/// sink retaining up to 720 rotated files under `myapp_logs/`, plus a
/// stdout duplicate when the resolved level is `DEBUG` -- matching the
/// reference implementation's `TimedRotatingFileHandler(when='H',
/// interval=1, backupCount=720)` and its `if log_level == 'DEBUG':
/// add stream handler` behavior.
///
/// Returns the file appender's worker guard; it must be kept alive for
/// the lifetime of the process or buffered log lines are lost on exit.
pub fn init(config: &Config) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::HOURLY)
        .max_log_files(720)
        .filename_prefix("async")
        .filename_suffix("log")
        .build("myapp_logs")
        .expect("failed to initialize rotating file appender");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let stdout_layer = (config.log_level == tracing::Level::DEBUG)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stdout));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}
