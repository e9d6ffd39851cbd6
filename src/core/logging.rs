use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::core::config::settings::LoggingSettings;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber: stdout plus a daily rolling file in `settings.dir`.
///
/// `RUST_LOG` overrides the default `info` filter. Calling this twice is a no-op.
pub fn init(settings: &LoggingSettings) {
    if LOG_GUARD.get().is_some() {
        return;
    }

    if let Err(err) = std::fs::create_dir_all(&settings.dir) {
        eprintln!(
            "Failed to create log directory {}: {}",
            settings.dir.display(),
            err
        );
    }

    let file_appender = tracing_appender::rolling::daily(&settings.dir, &settings.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(non_blocking);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();
}
