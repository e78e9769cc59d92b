#![deny(missing_docs)]
//! Shared logging utilities for the transcoder workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! the developer-facing diagnostic channel for messages emitted by the
//! transcoding engine itself, and a minimal test initializer for the global
//! logger.

/// Log target reserved for diagnostic lines produced by the transcoding engine.
///
/// These lines are never shown in the status line; they only reach the log
/// sinks configured for the process.
pub const ENGINE_DIAG_TARGET: &str = "engine";

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

/// Forwards a diagnostic line emitted by the engine to the developer channel.
#[macro_export]
macro_rules! engine_diag {
    ($($arg:tt)*) => {{
        log::info!(target: $crate::ENGINE_DIAG_TARGET, $($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
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
