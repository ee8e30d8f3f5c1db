//! Fault recording.
//!
//! Unexpected (non-operational) errors are hidden from clients in production;
//! a [`FaultSink`] is where they go instead. Recording is fire-and-forget and
//! must never fail or panic.

use std::sync::Mutex;

use natours_core::RawError;

/// Destination for unexpected faults.
pub trait FaultSink: Send + Sync {
    fn record(&self, error: &RawError, stack: &str);
}

/// Emits each fault as an `error` level tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFaultSink;

impl FaultSink for TracingFaultSink {
    fn record(&self, error: &RawError, stack: &str) {
        tracing::error!(
            name = error.name(),
            status_code = ?error.status_code(),
            stack,
            "ERROR: {error}"
        );
    }
}

/// Keeps recorded faults in memory (tests, diagnostics).
#[derive(Debug, Default)]
pub struct MemoryFaultSink {
    inner: Mutex<Vec<RawError>>,
}

impl MemoryFaultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn recorded(&self) -> Vec<RawError> {
        match self.inner.lock() {
            Ok(v) => v.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl FaultSink for MemoryFaultSink {
    fn record(&self, error: &RawError, _stack: &str) {
        match self.inner.lock() {
            Ok(mut v) => v.push(error.clone()),
            Err(poisoned) => poisoned.into_inner().push(error.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_keeps_faults_in_order() {
        let sink = MemoryFaultSink::new();
        sink.record(&RawError::fault("first"), "");
        sink.record(&RawError::fault_with_status("second", 400), "");
        assert_eq!(
            sink.recorded(),
            vec![RawError::fault("first"), RawError::fault_with_status("second", 400)]
        );
    }

    #[test]
    fn tracing_sink_never_panics_without_subscriber() {
        TracingFaultSink.record(&RawError::fault("boom"), "Error: boom");
    }
}
