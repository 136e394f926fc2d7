//! Diagnostic sink injected into the reporter.

use std::error::Error;

/// Receives the reporter's warnings.
///
/// The reporter never logs through a global; whatever sink it was built with
/// sees every warning, which keeps failure reporting observable in tests.
pub trait DiagnosticSink: Send + Sync {
    /// Records a warning together with the error that caused it.
    fn warn(&self, message: &str, error: &dyn Error);
}

/// Default sink: forwards to the `tracing` crate at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, message: &str, error: &dyn Error) {
        tracing::warn!(target: "otlp_reporter", error = %error, "{message}");
    }
}
