//! Diagnostic emission for events.
//!
//! Events never format or own log output; they hand a message, a level and a
//! source tag to a [`Diagnostics`] implementation chosen at construction.

use tracing::Level;

pub trait Diagnostics: Send + Sync {
    fn log(&self, level: Level, source: &str, message: &str);
}

/// Forwards to `tracing` under the `herald` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn log(&self, level: Level, source: &str, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "herald", source, "{}", message),
            Level::WARN => tracing::warn!(target: "herald", source, "{}", message),
            Level::INFO => tracing::info!(target: "herald", source, "{}", message),
            Level::DEBUG => tracing::debug!(target: "herald", source, "{}", message),
            _ => tracing::trace!(target: "herald", source, "{}", message),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn log(&self, _level: Level, _source: &str, _message: &str) {}
}
