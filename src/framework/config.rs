//! Per-store configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for a single [`ResourceStore`](crate::framework::ResourceStore).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound for one bulk load. `None` waits for the loader indefinitely,
    /// in which case a hung loader keeps the store in `is_loading` forever.
    pub fetch_timeout: Option<Duration>,
}

impl StoreConfig {
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }
}
