//! # Observability
//!
//! Logging bootstrap for the allowance binaries.
//!
//! Libraries only use `tracing` macros. Binaries call [`init`] or
//! [`init_with_config`] once at startup to decide where events go:
//!
//! - stderr, compact or JSON, filtered by `RUST_LOG` or the default level
//! - optionally a JSONL file, append-only with a flush per line
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "allowance-cli".into(),
//!         default_level: "warn".into(),
//!         ..Default::default()
//!     })
//!     .ok();
//!     tracing::info!("ready");
//! }
//! ```

mod file;

pub use file::{default_log_path, FileLogWriter};

use std::io;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Format of the stderr output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StderrFormat {
    #[default]
    Compact,
    Json,
    /// No stderr output.
    Off,
}

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, logged once at startup.
    pub service_name: String,

    /// Default level filter (e.g. "debug", "info", "warn").
    /// `RUST_LOG` takes precedence when set.
    pub default_level: String,

    /// JSONL file to append events to. No file when `None`.
    pub log_path: Option<PathBuf>,

    /// Stderr output format.
    pub stderr: StderrFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            stderr: StderrFormat::Compact,
        }
    }
}

/// Initialize logging with default settings.
///
/// Does nothing if a global subscriber is already installed.
pub fn init(service_name: &str) {
    let _ = init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize logging with custom configuration.
///
/// Fails if the log file cannot be opened or a global subscriber is
/// already installed.
pub fn init_with_config(config: LogConfig) -> io::Result<()> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if let Some(path) = &config.log_path {
        let writer = FileLogWriter::open(path)?;
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_writer(writer)
                .with_filter(env_filter(&config.default_level))
                .boxed(),
        );
    }

    match config.stderr {
        StderrFormat::Compact => layers.push(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .compact()
                .with_writer(io::stderr)
                .with_filter(env_filter(&config.default_level))
                .boxed(),
        ),
        StderrFormat::Json => layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_filter(env_filter(&config.default_level))
                .boxed(),
        ),
        StderrFormat::Off => {}
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        log_path = ?config.log_path,
        "observability initialized"
    );
    Ok(())
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
