//! Process-wide tracing setup shared by the binaries.

/// Initialize structured logging.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    tracing::init();
}

pub mod tracing;
