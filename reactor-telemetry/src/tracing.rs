use std::io;
use std::sync::Once;

use reactor_config::Environment;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::LogTracer;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// Filter applied when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable enabling log output in tests.
const ENABLE_TRACING_ENV_NAME: &str = "ENABLE_TRACING";

static INIT_TEST_TRACING: Once = Once::new();

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to determine the runtime environment: {0}")]
    Environment(#[from] io::Error),

    #[error("failed to bridge `log` records into tracing: {0}")]
    LogBridge(#[from] tracing_log::log::SetLoggerError),

    #[error("failed to install the global tracing subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Flushes buffered log lines when dropped.
///
/// Keep it alive until the process exits, dropping it early loses log output.
#[must_use = "dropping the flusher stops background log writing"]
pub struct LogFlusher {
    _guard: WorkerGuard,
}

/// Installs the global tracing subscriber for `app_name`.
///
/// Logs go to stdout through a non-blocking writer. Production uses JSON lines, development uses
/// the human-readable format. The filter comes from `RUST_LOG` and defaults to `info`. Records
/// emitted through the `log` crate are forwarded as well.
pub fn init_tracing(app_name: &str) -> Result<LogFlusher, TracingError> {
    let environment = Environment::load()?;

    LogTracer::init()?;

    let (writer, guard) = tracing_appender::non_blocking(io::stdout());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json_layer = environment.is_prod().then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(writer.clone())
    });
    let pretty_layer = (!environment.is_prod()).then(|| {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_writer(writer)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()?;

    tracing::info!(app = app_name, %environment, "tracing initialized");

    Ok(LogFlusher { _guard: guard })
}

/// Installs a test subscriber once per process when `ENABLE_TRACING` is set.
///
/// Output is captured by the test harness. Calling it again, or when another subscriber is
/// already installed, has no effect.
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        if std::env::var(ENABLE_TRACING_ENV_NAME).is_err() {
            return;
        }

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer())
            .try_init();
    });
}
