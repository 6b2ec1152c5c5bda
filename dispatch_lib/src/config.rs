use std::time::Duration;

use tracing::Level;

use crate::constants::VALID_API_KEYS;

/// Runtime parameters resolved once at process startup: from the
/// environment (optionally pre-populated by a `.env` file), then
/// overridden by whatever the CLI layer passes in explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub api_timeout: Duration,
    pub log_level: Level,
    pub api_keys: Vec<String>,
}

impl Config {
    /// Resolves `LOG_LEVEL`, `API_TIMEOUT`, and `DISPATCH_URL` from the
    /// process environment. A malformed `API_TIMEOUT` or `LOG_LEVEL` is
    /// logged and the default is used rather than aborting -- this is
    /// ambient plumbing, not a correctness-critical path.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("API_TIMEOUT") {
            match raw.parse::<f64>() {
                Ok(secs) if secs > 0.0 => config.api_timeout = Duration::from_secs_f64(secs),
                _ => tracing::warn!(value = %raw, "ignoring invalid API_TIMEOUT"),
            }
        }

        if let Ok(raw) = std::env::var("LOG_LEVEL") {
            match raw.to_uppercase().parse::<Level>() {
                Ok(level) => config.log_level = level,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid LOG_LEVEL"),
            }
        }

        if let Ok(url) = std::env::var("DISPATCH_URL") {
            config.url = url;
        }

        config
    }

    /// Restricts the fixed credential list to the first `n` entries, as
    /// the `--workers` CLI flag asks for. `n` is capped at
    /// `VALID_API_KEYS.len()`: one Worker must own exactly one
    /// credential (spec.md section 5), so a request for more workers
    /// than there are credentials cannot be honored by repeating a key
    /// across two workers -- that would let two tasks race on the same
    /// credential's nonce stream. The excess is logged and dropped
    /// rather than silently creating that race.
    pub fn with_worker_count(mut self, n: usize) -> Self {
        if n == 0 {
            return self;
        }
        if n > VALID_API_KEYS.len() {
            tracing::warn!(
                requested = n,
                available = VALID_API_KEYS.len(),
                "capping --workers to the number of distinct credentials"
            );
        }
        let n = n.min(VALID_API_KEYS.len());
        self.api_keys = VALID_API_KEYS[..n].iter().map(|s| s.to_string()).collect();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9999/api/request".to_string(),
            api_timeout: Duration::from_secs_f64(1.0),
            log_level: Level::DEBUG,
            api_keys: VALID_API_KEYS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.url, "http://127.0.0.1:9999/api/request");
        assert_eq!(config.api_timeout, Duration::from_secs(1));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.api_keys.len(), 5);
    }

    #[test]
    fn with_worker_count_restricts_to_a_prefix_of_the_fixed_list() {
        let config = Config::default().with_worker_count(3);
        assert_eq!(config.api_keys.len(), 3);
        assert_eq!(config.api_keys.as_slice(), &VALID_API_KEYS[..3]);
    }

    #[test]
    fn with_worker_count_caps_at_the_number_of_distinct_credentials() {
        let config = Config::default().with_worker_count(7);
        // Never repeat a credential across workers: two workers sharing
        // a key would race on that key's nonce stream.
        assert_eq!(config.api_keys.len(), VALID_API_KEYS.len());
        let unique: std::collections::HashSet<_> = config.api_keys.iter().collect();
        assert_eq!(unique.len(), config.api_keys.len());
    }

    #[test]
    fn with_worker_count_zero_is_a_no_op() {
        let config = Config::default().with_worker_count(0);
        assert_eq!(config.api_keys.len(), 5);
    }
}
