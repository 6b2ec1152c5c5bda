use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fixed credential list, ported verbatim from the original Flask
/// reference server (`examples/original_source/simple_rest_server.py`).
pub const VALID_API_KEYS: [&str; 5] = [
    "UT4NHL1J796WCHULA1750MXYF9F5JYA6",
    "8TY2F3KIL38T741G1UCBMCAQ75XU9F5O",
    "954IXKJN28CBDKHSKHURQIVLQHZIEEM9",
    "EUU46ID478HOO7GOXFASKPOZ9P91XGYS",
    "46V5EZ5K2DFAGW85J18L50SGO25WJ5JE",
];

pub const PER_SEC_RATE: usize = 20;
pub const MAX_LATENCY_MS: u64 = 50;
pub const MAX_429_REJECTS: u32 = 10;

pub fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_millis() as u64
}

/// A fixed-size ring of the last `PER_SEC_RATE` access times. Unlike the
/// dispatcher's own `dispatch_api::RateLimiter`, the reference server has
/// no minimum-gap check -- only the 1-second sliding window, and it never
/// waits: a full window is simply rejected with 429 rather than delayed.
pub struct ServerRateLimiter {
    access_times: Vec<u64>,
    idx: usize,
}

impl ServerRateLimiter {
    pub fn new(rate: usize) -> Self {
        Self {
            access_times: vec![0; rate],
            idx: 0,
        }
    }

    /// Ported from `RateLimiter.acquire_slot_if_possible`: grants the
    /// slot if the oldest tracked access is more than 1000ms in the
    /// past, otherwise refuses.
    pub fn acquire_slot_if_possible(&mut self) -> bool {
        let now = timestamp_ms();
        if now.saturating_sub(self.access_times[self.idx]) > 1000 {
            self.access_times[self.idx] = now;
            self.idx = (self.idx + 1) % self.access_times.len();
            true
        } else {
            false
        }
    }
}

/// Per-credential state: the last accepted nonce, this key's own rate
/// limiter, and a running count of 429 rejections that eventually trips
/// the key into a permanently-blocked (403) state.
pub struct PerKeyState {
    pub prev_nonce: i64,
    pub rate_limiter: ServerRateLimiter,
    pub error_429s: u32,
}

impl Default for PerKeyState {
    fn default() -> Self {
        Self {
            prev_nonce: 0,
            rate_limiter: ServerRateLimiter::new(PER_SEC_RATE),
            error_429s: 0,
        }
    }
}

/// Shared, mutex-guarded state for every configured credential.
pub struct AppState {
    pub keys: Mutex<HashMap<String, PerKeyState>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
