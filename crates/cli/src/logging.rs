//! Logging context for one run.
//!
//! Console output always shows INFO and above (`RUST_LOG` overrides the
//! level). With `--debug` a second layer writes DEBUG and above to
//! [`LOG_FILE`], truncated at start-up.
//!
//! The subscriber is installed with [`tracing::subscriber::set_default`]
//! rather than globally, so it lives exactly as long as the returned
//! [`LoggingContext`]. Dropping the context uninstalls it and closes the file.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Debug log file, relative to the working directory.
pub const LOG_FILE: &str = "bypassed_prs.log";

/// Where log events go.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Console filter used when `RUST_LOG` is unset.
    pub console_level: LevelFilter,
    /// Debug log file; `None` disables file logging.
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// Console at INFO; the debug log file only when `debug` is set.
    pub fn for_mode(debug: bool) -> Self {
        Self {
            console_level: LevelFilter::INFO,
            file: debug.then(|| PathBuf::from(LOG_FILE)),
        }
    }
}

/// Keeps the run's subscriber installed. Hold it for the whole run.
pub struct LoggingContext {
    _guard: DefaultGuard,
    file: Option<PathBuf>,
}

impl LoggingContext {
    /// Path of the debug log file, if file logging is enabled.
    pub fn log_file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

/// Build the subscriber described by `settings` and install it for the
/// current thread.
///
/// # Errors
///
/// Fails only when the debug log file cannot be created.
pub fn init(settings: &LogSettings) -> io::Result<LoggingContext> {
    let console_filter = EnvFilter::builder()
        .with_default_directive(settings.console_level.into())
        .from_env_lossy();
    let console = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(console_filter);

    let file_layer = match &settings.file {
        Some(path) => {
            let file = File::create(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file))
                    .with_filter(LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry().with(console).with(file_layer);
    let guard = tracing::subscriber::set_default(subscriber);

    Ok(LoggingContext {
        _guard: guard,
        file: settings.file.clone(),
    })
}
