//! Container-wide sync configuration.

use crate::framework::StoreConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

pub const FETCH_TIMEOUT_ENV: &str = "POS_SYNC_FETCH_TIMEOUT_MS";
pub const DISPATCH_BUFFER_ENV: &str = "POS_SYNC_DISPATCH_BUFFER";

const DEFAULT_DISPATCH_BUFFER: usize = 256;

/// Settings shared by every store a [`PosSystem`](crate::lifecycle::PosSystem) creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound for each bulk load. `None` never times out.
    pub fetch_timeout: Option<Duration>,
    /// Capacity of the channel between the transport and the dispatcher.
    pub dispatch_buffer: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: None,
            dispatch_buffer: DEFAULT_DISPATCH_BUFFER,
        }
    }
}

impl SyncConfig {
    /// Reads `POS_SYNC_FETCH_TIMEOUT_MS` and `POS_SYNC_DISPATCH_BUFFER`.
    ///
    /// Unset variables keep their defaults; unparseable ones are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            fetch_timeout: parse_positive(FETCH_TIMEOUT_ENV, lookup(FETCH_TIMEOUT_ENV))
                .map(Duration::from_millis)
                .or(defaults.fetch_timeout),
            dispatch_buffer: parse_positive(DISPATCH_BUFFER_ENV, lookup(DISPATCH_BUFFER_ENV))
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(defaults.dispatch_buffer),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            fetch_timeout: self.fetch_timeout,
        }
    }
}

fn parse_positive(name: &str, value: Option<String>) -> Option<u64> {
    let value = value?;
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!(variable = name, %value, "Ignoring invalid setting");
            None
        }
    }
}
