//! # Runtime Configuration
//!
//! Coroutine runtime settings applied before the server starts.
//!
//! ## `DISHPATCH_STACK_SIZE`
//!
//! Stack size for request coroutines, in decimal (`32768`) or hex (`0x8000`).
//! Default: `0x8000` (32 KB). Handlers that serialize large payloads or recurse
//! deeply need more; every concurrent connection holds one stack.
//!
//! ```bash
//! export DISHPATCH_STACK_SIZE=0x10000
//! dishpatch serve
//! ```

/// Default coroutine stack size in bytes.
pub const DEFAULT_STACK_SIZE: usize = 0x8000;

/// Environment variable overriding the stack size.
pub const STACK_SIZE_ENV: &str = "DISHPATCH_STACK_SIZE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes.
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// Apply to the global `may` configuration. Call before starting the server.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

/// Parse `"32768"` or `"0x8000"`.
#[must_use]
pub fn parse_size(value: &str) -> Option<usize> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("0x4000"), Some(0x4000));
        assert_eq!(parse_size("0X10"), Some(16));
        assert_eq!(parse_size(" 65536 "), Some(65536));
        assert_eq!(parse_size("big"), None);
    }
}
