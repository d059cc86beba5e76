//! Verbosity-gated diagnostics for the analysis pipeline.
//!
//! The engine is a pure computation, so diagnostics go to stderr and cost a
//! single integer comparison when disabled. Levels:
//! - 0: SILENT
//! - 1: CHANGES (synthetic edges injected, forecast summary)
//! - 2: CHECKS (baseline vs leveled makespan, chain and buffer sizes)
//! - 3: DEBUG (per-group leveling decisions, fastest/slowest trial)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Shared body of the level macros. Not meant to be called directly.
#[doc(hidden)]
#[macro_export]
macro_rules! __ccpm_log_at {
    ($level:expr, $verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $level {
            eprintln!("[ccpm] {}", format_args!($($arg)*));
        }
    };
}

/// Log at CHANGES level (verbosity >= 1).
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::__ccpm_log_at!($crate::logging::VERBOSITY_CHANGES, $verbosity, $($arg)*)
    };
}

/// Log at CHECKS level (verbosity >= 2).
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::__ccpm_log_at!($crate::logging::VERBOSITY_CHECKS, $verbosity, $($arg)*)
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::__ccpm_log_at!($crate::logging::VERBOSITY_DEBUG, $verbosity, $($arg)*)
    };
}
