//! Tracing/logging setup shared by the binaries.

/// Install the JSON subscriber used by long-running services.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    subscriber::init_json("info");
}

/// Install a compact stderr subscriber for interactive tools, so log lines
/// never interleave with what the user reads on stdout.
pub fn init_console() {
    subscriber::init_compact("warn");
}

/// Subscriber construction (filters, formatters).
pub mod subscriber;
