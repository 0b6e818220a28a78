//! Runtime configuration for an agora node.
//!
//! The [`Config`] struct centralises tunable parameters such as the forging
//! cadence and network timeouts. It is constructed via the [`ConfigBuilder`]
//! using the fluent builder pattern, so callers customise only the fields
//! they care about while keeping sensible defaults.
//!
//! ```
//! use agora_core::config::Config;
//!
//! let cfg = Config::default();
//! assert_eq!(cfg.forging_interval.as_secs(), 20);
//! ```

use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration shared across the node's tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How often the forger wakes to check whether it should produce.
    pub forging_interval: Duration,

    /// Minimum sleep after a forging-loop error, to avoid tight error loops.
    pub error_backoff: Duration,

    /// Timeout for fetching a peer's full chain during reconciliation.
    pub chain_fetch_timeout: Duration,

    /// Timeout for delivering a freshly forged block to one peer.
    pub broadcast_timeout: Duration,

    /// Directory holding per-node snapshot files.
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            forging_interval: Duration::from_secs(20),
            error_backoff: Duration::from_secs(60),
            chain_fetch_timeout: Duration::from_secs(10),
            broadcast_timeout: Duration::from_secs(5),
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Fluent builder for [`Config`].
pub struct ConfigBuilder {
    inner: Config,
}

impl ConfigBuilder {
    /// Starts a new builder pre-populated with [`Config::default`].
    pub fn new() -> Self {
        Self {
            inner: Config::default(),
        }
    }

    pub fn forging_interval(mut self, interval: Duration) -> Self {
        self.inner.forging_interval = interval;
        self
    }

    pub fn error_backoff(mut self, backoff: Duration) -> Self {
        self.inner.error_backoff = backoff;
        self
    }

    pub fn chain_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.inner.chain_fetch_timeout = timeout;
        self
    }

    pub fn broadcast_timeout(mut self, timeout: Duration) -> Self {
        self.inner.broadcast_timeout = timeout;
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner.data_dir = dir.into();
        self
    }

    /// Consumes the builder returning an immutable configuration value.
    pub fn finish(self) -> Config {
        self.inner
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
