//! Configuration for exit validation

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Default number of rebuilt block trees kept in memory.
pub const DEFAULT_MAX_CACHED_TREES: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Maximum number of block trees to cache (default: 256).
    ///
    /// Bounds memory usage; the least recently used tree is evicted.
    pub max_cached_trees: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_cached_trees: DEFAULT_MAX_CACHED_TREES,
        }
    }
}

impl ValidatorConfig {
    /// Cache capacity, at least one tree.
    pub fn cache_capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_cached_trees).unwrap_or(NonZeroUsize::MIN)
    }
}
