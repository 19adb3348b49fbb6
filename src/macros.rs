//! Macros used throughout the library.

/// Convenience macro to log a message at the given level and also print it
/// to `stderr`. Used by the `respcat` demo binary for diagnostics that
/// should reach a user's terminal even without `RUST_LOG` set.
#[macro_export]
macro_rules! log_and_stderr {
    ($level:ident, $msg:expr) => {
        log::$level!("{}", $msg);
        eprintln!("{}", $msg);
    };
    ($level:ident, $msg:expr, $arg:expr) => {
        log::$level!("{} {}", $msg, $arg);
        eprintln!("{} {}", $msg, $arg);
    };
}
