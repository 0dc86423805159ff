//! Error reporting
//!
//! Fire-and-forget sink for diagnostics about transient failures.

use serde_json::Value;
use tracing::warn;

/// Receives diagnostics that must not affect control flow
pub trait ErrorReporter: Send + Sync {
    fn notify(&self, message: &str, context: &Value);
}

/// Reporter that emits diagnostics as `tracing` warnings
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn notify(&self, message: &str, context: &Value) {
        warn!(context = %context, "{}", message);
    }
}
