//! Logging configuration using tracing

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "STOCK_SHEETS_LOG";

/// Initialize the logging subsystem.
///
/// Logs go to stderr so command output on stdout stays clean. The level is
/// controlled by `STOCK_SHEETS_LOG`:
///
/// ```bash
/// STOCK_SHEETS_LOG=debug stock-sheets list
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("stock_sheets=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_timer(fmt::time::ChronoLocal::new("%H:%M:%S%.3f".to_string())),
        )
        .try_init();
}
