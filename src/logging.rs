//! Tracing subscriber configuration.
//!
//! Logs always go to stderr: a station's stdout is its ring output and the
//! hub's stdout carries JSON reports.
//!
//! Log levels follow these conventions:
//! - ERROR: relay link failures, station I/O failures
//! - WARN: framing errors, buffer overflow, ignored acks
//! - INFO: messages sent and received, link closure, start and stop
//! - DEBUG: token passing, queued frames
//! - TRACE: idle token circulation

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// Log level can be controlled via the `RUST_LOG` environment variable.
/// Defaults to `info` if not set.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the tracing subscriber with JSON output on stderr.
///
/// Activated by setting `RUST_LOG_FORMAT=json`.
pub fn init_json() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the tracing subscriber for tests.
///
/// Uses `try_init` to avoid panicking if called multiple times.
pub fn init_for_tests() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
