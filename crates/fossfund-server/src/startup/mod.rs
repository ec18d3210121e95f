//! Application startup utilities module.

mod http;
mod logging;
mod shutdown;

pub use http::{access_logger, configure_app, main_server};
pub use logging::{LogRotation, LoggingConfig, LoggingGuard, init_logging};
pub use shutdown::{GracefulShutdown, ShutdownSignal, run_with_shutdown, wait_for_shutdown_signal};
