//! ## hearth-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! Installs the process-wide fmt subscriber. `RUST_LOG` takes precedence over the
//! configured default level.

use tracing::info_span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. Calling it again is a no-op.
    pub fn init(default_level: &str) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        let _ = fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .with_span_events(FmtSpan::ENTER)
            .try_init();
    }

    /// Records the outcome of a finished run.
    #[inline]
    pub fn log_run_summary(completed: u64, truncated: u64, max_wait: f64, mean_wait: f64) {
        let span = info_span!("run_summary");
        let _guard = span.enter();
        tracing::info!(
            completed,
            truncated,
            max_wait_hours = max_wait,
            mean_wait_hours = mean_wait,
            "Simulation finished"
        );
    }
}
