//! Exit codes for the `diffspell` binary

/// Completed, nothing flagged
pub const SUCCESS: i32 = 0;
/// Completed, at least one identifier flagged
pub const TYPOS_FOUND: i32 = 1;
/// Configuration, I/O or argument error
pub const TOOL_ERROR: i32 = 2;

pub mod exit {
    use super::*;

    pub fn success() -> ! {
        std::process::exit(SUCCESS)
    }

    pub fn typos_found() -> ! {
        std::process::exit(TYPOS_FOUND)
    }

    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR)
    }
}
