//! # UTXO Position
//!
//! Composite ledger key `(blknum, txindex, oindex)` and its packed integer
//! form `blknum * 1_000_000_000 + txindex * 10_000 + oindex`.
//!
//! The multipliers are fixed by the root-chain contract and are not
//! configurable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::PositionError;

/// Multiplier applied to the block number when packing.
pub const BLOCK_OFFSET: u64 = 1_000_000_000;

/// Multiplier applied to the transaction index when packing.
pub const TX_OFFSET: u64 = 10_000;

/// Exclusive upper bound for a transaction index.
pub const MAX_TX_INDEX: u32 = (BLOCK_OFFSET / TX_OFFSET) as u32;

/// Exclusive upper bound for an output index.
pub const MAX_OUTPUT_INDEX: u16 = TX_OFFSET as u16;

/// Largest block number whose packed positions all fit in a `u64`.
pub const MAX_BLOCK_NUMBER: u64 = u64::MAX / BLOCK_OFFSET - 1;

/// Location of a transaction output on the child chain.
///
/// Components are private so every value fits the packed layout; build one
/// with [`UtxoPosition::new`], [`UtxoPosition::deposit`] or
/// [`UtxoPosition::unpack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct UtxoPosition {
    blknum: u64,
    txindex: u32,
    oindex: u16,
}

/// Unchecked wire shape, validated on deserialization.
#[derive(Deserialize)]
struct RawPosition {
    blknum: u64,
    txindex: u32,
    oindex: u16,
}

impl TryFrom<RawPosition> for UtxoPosition {
    type Error = PositionError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Self::new(raw.blknum, raw.txindex, raw.oindex)
    }
}

impl UtxoPosition {
    /// The all-zero position marking an absent transaction input.
    pub const NULL: Self = Self {
        blknum: 0,
        txindex: 0,
        oindex: 0,
    };

    /// Build a position, checking each component fits the packed layout.
    pub fn new(blknum: u64, txindex: u32, oindex: u16) -> Result<Self, PositionError> {
        if txindex >= MAX_TX_INDEX {
            return Err(PositionError::TxIndexOutOfRange {
                txindex,
                max: MAX_TX_INDEX - 1,
            });
        }
        if oindex >= MAX_OUTPUT_INDEX {
            return Err(PositionError::OutputIndexOutOfRange {
                oindex,
                max: MAX_OUTPUT_INDEX - 1,
            });
        }
        if blknum > MAX_BLOCK_NUMBER {
            return Err(PositionError::BlockNumberOverflow { blknum });
        }
        Ok(Self {
            blknum,
            txindex,
            oindex,
        })
    }

    /// Position of the single output of a deposit block.
    pub fn deposit(blknum: u64) -> Result<Self, PositionError> {
        Self::new(blknum, 0, 0)
    }

    pub fn blknum(&self) -> u64 {
        self.blknum
    }

    pub fn txindex(&self) -> u32 {
        self.txindex
    }

    pub fn oindex(&self) -> u16 {
        self.oindex
    }

    /// Pack into the root-chain `utxoPos` integer.
    ///
    /// Cannot overflow: `blknum <= MAX_BLOCK_NUMBER` leaves room for the
    /// largest transaction and output index.
    pub fn pack(&self) -> u64 {
        self.blknum * BLOCK_OFFSET + u64::from(self.txindex) * TX_OFFSET + u64::from(self.oindex)
    }

    /// Unpack a root-chain `utxoPos` integer.
    pub fn unpack(packed: u64) -> Result<Self, PositionError> {
        let remainder = packed % BLOCK_OFFSET;
        Self::new(
            packed / BLOCK_OFFSET,
            (remainder / TX_OFFSET) as u32,
            (remainder % TX_OFFSET) as u16,
        )
    }

    /// Position of the transaction itself, at output 0.
    pub fn tx_position(&self) -> Self {
        Self { oindex: 0, ..*self }
    }

    /// Same block and transaction, different output.
    pub fn with_output(&self, oindex: u16) -> Result<Self, PositionError> {
        Self::new(self.blknum, self.txindex, oindex)
    }
}

impl fmt::Display for UtxoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.blknum, self.txindex, self.oindex)
    }
}

impl From<UtxoPosition> for u64 {
    fn from(position: UtxoPosition) -> Self {
        position.pack()
    }
}
