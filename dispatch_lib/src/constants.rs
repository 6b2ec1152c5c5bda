//! Compile-time constants that must match the reference server's
//! expectations (spec.md section 6).

/// Per-credential quota: max acquisitions in any 1000ms sliding window.
pub const PER_SEC_RATE: usize = 20;

/// End-to-end time-to-live for a request, in milliseconds.
pub const REQUEST_TTL_MS: u64 = 1000;

/// Minimum interval between two consecutive HTTP issues on one worker's
/// rate limiter, in milliseconds. `floor(1000 / PER_SEC_RATE)`.
pub const DURATION_MS_BETWEEN_REQUESTS: u64 = 1000 / PER_SEC_RATE as u64;

/// Target aggregate request rate across all workers.
pub const GLOBAL_TARGET_RATE: u32 = 20;

/// Fixed credential list, one Worker per entry, ported verbatim from the
/// reference implementation.
pub const VALID_API_KEYS: [&str; 5] = [
    "UT4NHL1J796WCHULA1750MXYF9F5JYA6",
    "8TY2F3KIL38T741G1UCBMCAQ75XU9F5O",
    "954IXKJN28CBDKHSKHURQIVLQHZIEEM9",
    "EUU46ID478HOO7GOXFASKPOZ9P91XGYS",
    "46V5EZ5K2DFAGW85J18L50SGO25WJ5JE",
];
