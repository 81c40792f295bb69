//! Diagnostic logging setup

use tracing::Level;

/// Environment variable selecting the log level (`error`, `warn`, `info`, `debug`, `trace`).
pub const LOG_ENV: &str = "TRANSFER_SIM_LOG";

/// Level used when `TRANSFER_SIM_LOG` is unset or unparsable.
pub fn log_level() -> Level {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<Level>().ok())
        .unwrap_or(Level::WARN)
}

/// Installs a fmt subscriber on stderr so stdout carries only the report.
/// Calling it twice is harmless.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(log_level())
        .with_target(false)
        .try_init();
}
