//! Logging helpers shared across the workspace.
//!
//! All crates log through `tracing`; this crate adds the `crit!` macro for
//! should-never-happen conditions and a test subscriber initialiser.

use tracing_subscriber::EnvFilter;

/// Target attached to `crit!` events so that they can be filtered and alerted on.
pub const CRIT_TARGET: &str = "crit";

/// Log a critical error.
///
/// A `crit!` indicates a bug or state corruption rather than an environmental
/// failure, and is emitted at `ERROR` level under the [`CRIT_TARGET`] target.
#[macro_export]
macro_rules! crit {
    ($($arg:tt)*) => {
        tracing::error!(target: $crate::CRIT_TARGET, $($arg)*);
    };
}

/// Install a global `fmt` subscriber for tests.
///
/// Respects `RUST_LOG`; repeated calls are no-ops so each test may call it.
pub fn test_logger() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
