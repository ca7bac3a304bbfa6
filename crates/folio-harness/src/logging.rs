#![forbid(unsafe_code)]

//! Logging setup.
//!
//! Controller transitions are emitted through `tracing`. Tests that want to see
//! them call [`init_test_logging`] and run with `RUST_LOG=folio_core=trace`.
//! The replay runner uses [`init_cli_logging`] so stdout carries only its JSON.

use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once per process.
///
/// Output goes through the test writer so it is captured per test. Later calls
/// are no-ops.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .try_init();
}

/// Install the replay runner's subscriber: `RUST_LOG` filtered, written to
/// stderr.
pub fn init_cli_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
