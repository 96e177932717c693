//! Tracing/logging setup shared by binaries.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::Format::Json);
}

/// Initialize with human-readable output instead of JSON.
pub fn init_pretty() {
    tracing::init(tracing::Format::Pretty);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
