//! Configuration types for the child-chain ledger

use pc_02_fixed_merkle::{MerkleConfig, DEFAULT_DEPTH};
use serde::{Deserialize, Serialize};
use shared_types::{address_from_hex, Address, MAX_TX_INDEX, NULL_ADDRESS};

use crate::error::{ChildChainError, Result};

/// Step between consecutive operator block numbers.
pub const DEFAULT_CHILD_BLOCK_INTERVAL: u64 = 1000;

/// Environment variable holding the operator address (hex).
pub const ENV_AUTHORITY: &str = "PC_AUTHORITY";
/// Environment variable overriding the child block interval.
pub const ENV_CHILD_BLOCK_INTERVAL: &str = "PC_CHILD_BLOCK_INTERVAL";
/// Environment variable overriding the Merkle depth.
pub const ENV_MERKLE_DEPTH: &str = "PC_MERKLE_DEPTH";

/// Runtime configuration for the ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildChainConfig {
    /// Address whose key must sign every operator block
    pub authority: Address,

    /// Operator block numbers are positive multiples of this (default: 1000)
    pub child_block_interval: u64,

    /// Commitment tree depth shared with the root chain (default: 16)
    pub merkle_depth: usize,
}

impl Default for ChildChainConfig {
    fn default() -> Self {
        Self {
            authority: NULL_ADDRESS,
            child_block_interval: DEFAULT_CHILD_BLOCK_INTERVAL,
            merkle_depth: DEFAULT_DEPTH,
        }
    }
}

impl ChildChainConfig {
    /// Default configuration operated by `authority`.
    pub fn with_authority(authority: Address) -> Self {
        Self {
            authority,
            ..Self::default()
        }
    }

    /// Load from environment variables on top of the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` on top of the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_AUTHORITY) {
            config.authority = address_from_hex(value.trim()).ok_or_else(|| {
                ChildChainError::InvalidConfig(format!("{ENV_AUTHORITY} is not an address"))
            })?;
        }

        if let Some(value) = lookup(ENV_CHILD_BLOCK_INTERVAL) {
            config.child_block_interval = value.trim().parse().map_err(|_| {
                ChildChainError::InvalidConfig(format!("{ENV_CHILD_BLOCK_INTERVAL} must be an integer"))
            })?;
        }

        if let Some(value) = lookup(ENV_MERKLE_DEPTH) {
            config.merkle_depth = value.trim().parse().map_err(|_| {
                ChildChainError::InvalidConfig(format!("{ENV_MERKLE_DEPTH} must be an integer"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.authority == NULL_ADDRESS {
            return Err(ChildChainError::InvalidConfig(
                "authority address not set".into(),
            ));
        }

        // At least one deposit number must fit between operator blocks
        if self.child_block_interval < 2 {
            return Err(ChildChainError::InvalidConfig(format!(
                "child block interval {} must be at least 2",
                self.child_block_interval
            )));
        }

        let merkle = self.merkle_config();
        merkle.validate()?;

        // Every leaf index must be a packable transaction index
        if merkle.capacity() > MAX_TX_INDEX as usize {
            return Err(ChildChainError::InvalidConfig(format!(
                "merkle depth {} allows more transactions than a position can index",
                self.merkle_depth
            )));
        }

        Ok(())
    }

    pub fn merkle_config(&self) -> MerkleConfig {
        MerkleConfig::with_depth(self.merkle_depth)
    }
}
