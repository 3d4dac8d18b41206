//! Tracing subscriber setup.

use std::path::PathBuf;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter directives, same syntax as `RUST_LOG`.
pub const LOG_ENV: &str = "FARMMATE_LOG";

const VERBOSE_DIRECTIVES: &str = "warn,farmmate=debug,farmmate_core=debug,\
farmmate_infrastructure=debug,farmmate_interaction=debug,farmmate_application=debug";

/// Installs the global subscriber: stderr always, plus a daily log file
/// under `log_dir` when given. Keep the returned guard alive until exit so
/// buffered file output is flushed.
pub fn init(verbose: bool, log_dir: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_DIRECTIVES)
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(dir, "farmmate.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
