#![deny(missing_docs)]
//! Shared logging utilities for the encwatch workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a thread-local poll tick used to stamp reconciliation logs, and a minimal
//! test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the current reconciliation tick.
    static POLL_TICK: Cell<u64> = const { Cell::new(0) };
}

/// Sets the reconciliation tick for the current thread.
/// The render loop calls this once per tick before dispatching.
pub fn set_poll_tick(tick: u64) {
    POLL_TICK.with(|v| v.set(tick));
}

/// Retrieves the reconciliation tick for the current thread.
/// Returns 0 before the first tick.
pub fn poll_tick() -> u64 {
    POLL_TICK.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Logs an info-level message prefixed with the current poll tick.
#[macro_export]
macro_rules! tick_info {
    ($($arg:tt)*) => {{
        log::info!("[tick {}] {}", $crate::poll_tick(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message prefixed with the current poll tick.
#[macro_export]
macro_rules! tick_warn {
    ($($arg:tt)*) => {{
        log::warn!("[tick {}] {}", $crate::poll_tick(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_tick_is_thread_local() {
        set_poll_tick(7);
        assert_eq!(poll_tick(), 7);
        let other = std::thread::spawn(poll_tick).join().unwrap();
        assert_eq!(other, 0);
    }
}
