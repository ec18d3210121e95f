//! File-based logging module.
//!
//! Different components write to separate log files with daily rotation:
//!
//! | Log File          | Component                         | Target Prefixes                       |
//! |-------------------|-----------------------------------|---------------------------------------|
//! | fossfund.log      | Root logger (all components)      | (all)                                 |
//! | access.log        | HTTP access log (combined format) | fossfund_server::access               |
//! | error.log         | Warnings and errors               | (all, WARN and above)                 |
//! | persistence.log   | Database persistence              | fossfund_persistence                  |
//! | auth.log          | OAuth login and sessions          | fossfund_auth, fossfund_server::middleware |
//!
//! Log files are stored in `~/fossfund/logs` by default.
//! Override with `FOSSFUND_LOG_DIR` environment variable or `logs.path` config.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::model::constants::ACCESS_LOG_TARGET;

/// How lines of a log file are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineFormat {
    /// Timestamp, level, thread and target before the message
    Full,
    /// The message alone; access log lines carry their own timestamp
    Message,
}

/// A log file receiving the events of some targets
struct ComponentLog {
    file_name: &'static str,
    targets: &'static [&'static str],
    format: LineFormat,
}

const COMPONENT_LOGS: &[ComponentLog] = &[
    ComponentLog {
        file_name: "access.log",
        targets: &[ACCESS_LOG_TARGET],
        format: LineFormat::Message,
    },
    ComponentLog {
        file_name: "persistence.log",
        targets: &["fossfund_persistence", "sea_orm", "sqlx"],
        format: LineFormat::Full,
    },
    ComponentLog {
        file_name: "auth.log",
        targets: &["fossfund_auth", "fossfund_server::middleware"],
        format: LineFormat::Full,
    },
];

/// File receiving every WARN and ERROR event
const ERROR_LOG: &str = "error.log";

/// Root file receiving every event
const ROOT_LOG: &str = "fossfund.log";

// ---------------------------------------------------------------------------
// Log rotation policy
// ---------------------------------------------------------------------------

/// Log rotation policy
#[derive(Debug, Clone, Copy)]
pub enum LogRotation {
    /// Rotate daily (default)
    Daily,
    /// Rotate hourly
    Hourly,
    /// Never rotate (single file)
    Never,
}

impl FromStr for LogRotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(LogRotation::Daily),
            "hourly" => Ok(LogRotation::Hourly),
            "never" => Ok(LogRotation::Never),
            other => Err(format!("unknown log rotation '{}'", other)),
        }
    }
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging configuration
// ---------------------------------------------------------------------------

/// Logging configuration for the entire application.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Base log directory (default: `~/fossfund/logs`)
    pub log_dir: PathBuf,
    /// Enable console output
    pub console_output: bool,
    /// Console log level
    pub console_level: Level,
    /// Enable file logging
    pub file_logging: bool,
    /// Default log level for files
    pub file_level: Level,
    /// Log rotation policy
    pub rotation: LogRotation,
}

fn default_log_dir() -> PathBuf {
    std::env::var("FOSSFUND_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(format!("{}/fossfund/logs", home))
        })
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            console_output: true,
            console_level: Level::INFO,
            file_logging: true,
            file_level: Level::INFO,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    /// Create from application configuration.
    ///
    /// Unknown levels fall back to INFO and unknown rotations to daily.
    pub fn from_config(
        log_dir: Option<String>,
        console_output: bool,
        file_logging: bool,
        level: String,
        rotation: Option<String>,
    ) -> Self {
        let log_dir = log_dir.map(PathBuf::from).unwrap_or_else(default_log_dir);
        let level = level.parse().unwrap_or(Level::INFO);
        let rotation = rotation
            .and_then(|r| r.parse().ok())
            .unwrap_or(LogRotation::Daily);

        Self {
            log_dir,
            console_output,
            console_level: level,
            file_logging,
            file_level: level,
            rotation,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging guard
// ---------------------------------------------------------------------------

/// Guard that keeps the logging system alive.
///
/// Must be kept alive for the duration of the application. When dropped,
/// all buffered log output is flushed.
pub struct LoggingGuard {
    _file_guards: Vec<WorkerGuard>,
}

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn file_layer(
    config: &LoggingConfig,
    file_name: &str,
    format: LineFormat,
    guards: &mut Vec<WorkerGuard>,
) -> BoxedLayer {
    let appender = RollingFileAppender::new(config.rotation.into(), &config.log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    guards.push(guard);

    let layer = fmt::layer().with_writer(writer).with_ansi(false);
    match format {
        LineFormat::Full => Box::new(layer.with_target(true).with_thread_names(true)),
        LineFormat::Message => Box::new(
            layer
                .without_time()
                .with_level(false)
                .with_target(false),
        ),
    }
}

/// Initialize the logging system with multi-file output.
///
/// This sets up:
/// - Console output (optional, human-readable format with colors)
/// - Root log file `fossfund.log` that captures **all** events
/// - `error.log` with every WARN and ERROR event
/// - Component-specific log files with target-based routing (see [`COMPONENT_LOGS`])
///
/// The global `RUST_LOG` env var controls the level of the console and the
/// root file. Events of the `log` crate (actix-web's access logger among
/// them) are bridged into `tracing` by `try_init`.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;
    }

    let mut guards: Vec<WorkerGuard> = Vec::new();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.console_output {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.console_level.to_string()));
        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_filter(filter);
        layers.push(Box::new(console_layer));
    }

    if config.file_logging {
        let root_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.file_level.to_string()));
        layers.push(Box::new(
            file_layer(config, ROOT_LOG, LineFormat::Full, &mut guards).with_filter(root_filter),
        ));

        layers.push(Box::new(
            file_layer(config, ERROR_LOG, LineFormat::Full, &mut guards).with_filter(LevelFilter::WARN),
        ));

        for component in COMPONENT_LOGS {
            let mut targets = Targets::new();
            for target in component.targets {
                targets = targets.with_target(*target, LevelFilter::TRACE);
            }

            layers.push(Box::new(
                file_layer(config, component.file_name, component.format, &mut guards).with_filter(targets),
            ));
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))?;

    if config.file_logging {
        tracing::info!(
            log_dir = %config.log_dir.display(),
            component_files = COMPONENT_LOGS.len(),
            "File logging initialized: {} + {} + {} component log files",
            ROOT_LOG,
            ERROR_LOG,
            COMPONENT_LOGS.len()
        );
    }

    Ok(LoggingGuard {
        _file_guards: guards,
    })
}
