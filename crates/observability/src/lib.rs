//! Tracing/logging setup and the fault-logging collaborator.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Server-side recording of unexpected faults.
pub mod fault;

pub use fault::{FaultSink, MemoryFaultSink, TracingFaultSink};
