//! Built-in fallback values for configuration.

pub use crate::catalog::DEFAULT_API_BASE_URL;

/// Parallel binding fetches during the account scan (8).
pub fn default_scan_concurrency() -> usize {
    8
}

/// Per-request API timeout in seconds (30).
pub fn default_timeout_secs() -> u64 {
    30
}
