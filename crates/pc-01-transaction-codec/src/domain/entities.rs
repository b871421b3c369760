//! # Domain Entities
//!
//! The fixed-shape child-chain transaction: two inputs, two outputs, a fee
//! and one recoverable signature per input slot.

use k256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_types::{Address, Hash, UtxoPosition, NULL_ADDRESS, U256};
use std::fmt;

use super::ecdsa::{keccak256, recover_address, sign_hash};
use super::encoding;
use super::errors::CodecError;

/// Length of a recoverable signature: `r (32) || s (32) || v (1)`.
pub const SIGNATURE_LENGTH: usize = 65;

/// A recoverable secp256k1 signature.
pub type Signature = [u8; SIGNATURE_LENGTH];

/// The default signature of an unsigned slot.
pub const NULL_SIGNATURE: Signature = [0u8; SIGNATURE_LENGTH];

/// Input slot of a transaction. Each slot carries its own signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    /// Both slots in encoding order.
    pub const ALL: [Slot; 2] = [Slot::First, Slot::Second];

    /// Zero-based array index of the slot.
    pub fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::First => write!(f, "input slot 1"),
            Slot::Second => write!(f, "input slot 2"),
        }
    }
}

/// A transaction output: who may spend it and how much it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub owner: Address,
    pub amount: U256,
}

impl TxOutput {
    pub fn new(owner: Address, amount: impl Into<U256>) -> Self {
        Self {
            owner,
            amount: amount.into(),
        }
    }

    /// The zero output: null owner, zero amount.
    pub fn empty() -> Self {
        Self {
            owner: NULL_ADDRESS,
            amount: U256::zero(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_zero()
    }
}

/// A child-chain transaction.
///
/// An input whose `blknum` is zero is absent and needs no signature.
#[serde_as]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Spent positions, one per slot.
    pub inputs: [UtxoPosition; 2],
    /// Produced outputs; output index is the array index.
    pub outputs: [TxOutput; 2],
    /// Fee collected by the operator.
    pub fee: U256,
    /// Signatures, one per input slot.
    #[serde_as(as = "[Bytes; 2]")]
    pub signatures: [Signature; 2],
}

impl Transaction {
    /// Build an unsigned transaction.
    pub fn new(inputs: [UtxoPosition; 2], outputs: [TxOutput; 2], fee: impl Into<U256>) -> Self {
        Self {
            inputs,
            outputs,
            fee: fee.into(),
            signatures: [NULL_SIGNATURE; 2],
        }
    }

    /// The deposit transaction the root chain records: no inputs, a single
    /// output to `owner`.
    pub fn deposit(owner: Address, amount: impl Into<U256>) -> Self {
        Self::new(
            [UtxoPosition::NULL; 2],
            [TxOutput::new(owner, amount), TxOutput::empty()],
            U256::zero(),
        )
    }

    /// A single-input, single-output, zero-fee transfer.
    pub fn transfer(input: UtxoPosition, owner: Address, amount: impl Into<U256>) -> Self {
        Self::new(
            [input, UtxoPosition::NULL],
            [TxOutput::new(owner, amount), TxOutput::empty()],
            U256::zero(),
        )
    }

    pub fn input(&self, slot: Slot) -> &UtxoPosition {
        &self.inputs[slot.index()]
    }

    /// Output at `oindex`, if the index exists.
    pub fn output(&self, oindex: u16) -> Option<&TxOutput> {
        self.outputs.get(usize::from(oindex))
    }

    /// Whether the slot references a UTXO.
    pub fn has_input(&self, slot: Slot) -> bool {
        self.input(slot).blknum() != 0
    }

    /// Slots referencing a UTXO, with the referenced position.
    pub fn present_inputs(&self) -> impl Iterator<Item = (Slot, UtxoPosition)> + '_ {
        Slot::ALL
            .into_iter()
            .filter(|slot| self.has_input(*slot))
            .map(|slot| (slot, *self.input(slot)))
    }

    /// A transaction without any input only appears in deposit blocks.
    pub fn is_deposit(&self) -> bool {
        self.present_inputs().next().is_none()
    }

    pub fn signature(&self, slot: Slot) -> &Signature {
        &self.signatures[slot.index()]
    }

    pub fn is_signed(&self, slot: Slot) -> bool {
        *self.signature(slot) != NULL_SIGNATURE
    }

    /// Sum of both outputs and the fee, or `None` on overflow.
    pub fn total_spend(&self) -> Option<U256> {
        self.outputs[0]
            .amount
            .checked_add(self.outputs[1].amount)?
            .checked_add(self.fee)
    }

    // =========================================================================
    // Encoding & hashing
    // =========================================================================

    /// Canonical unsigned encoding (11 fields). This is what gets hashed.
    pub fn encode_unsigned(&self) -> Vec<u8> {
        encoding::encode_unsigned(self)
    }

    /// Wire encoding (11 fields followed by both signatures).
    pub fn encode(&self) -> Vec<u8> {
        encoding::encode_signed(self)
    }

    /// Decode either the unsigned or the signed wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        encoding::decode(bytes)
    }

    /// keccak256 of the unsigned encoding. Independent of signature state.
    pub fn hash(&self) -> Hash {
        keccak256(&self.encode_unsigned())
    }

    /// Block-commitment leaf: keccak256(hash || sig1 || sig2).
    pub fn merkle_hash(&self) -> Hash {
        let mut data = Vec::with_capacity(32 + 2 * SIGNATURE_LENGTH);
        data.extend_from_slice(&self.hash());
        data.extend_from_slice(&self.signatures[0]);
        data.extend_from_slice(&self.signatures[1]);
        keccak256(&data)
    }

    /// `sig1 || sig2`, as the root chain takes them.
    pub fn joined_signatures(&self) -> Vec<u8> {
        let mut sigs = Vec::with_capacity(2 * SIGNATURE_LENGTH);
        sigs.extend_from_slice(&self.signatures[0]);
        sigs.extend_from_slice(&self.signatures[1]);
        sigs
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    /// Sign the transaction hash into `slot`.
    pub fn sign(&mut self, slot: Slot, key: &SigningKey) -> Result<(), CodecError> {
        let signature = sign_hash(&self.hash(), key)?;
        self.signatures[slot.index()] = signature;
        Ok(())
    }

    /// Recover the address that signed `slot`.
    ///
    /// Returns `NULL_ADDRESS` for an unsigned slot.
    pub fn sender(&self, slot: Slot) -> Result<Address, CodecError> {
        if !self.is_signed(slot) {
            return Ok(NULL_ADDRESS);
        }
        recover_address(&self.hash(), self.signature(slot))
            .map_err(|source| CodecError::InvalidSignature { slot, source })
    }

    /// Check every present input is signed by its owner.
    ///
    /// `owners[i]` is the resolved owner of the UTXO referenced by slot `i`;
    /// entries for absent inputs are ignored.
    pub fn validate_signatures(&self, owners: [Option<Address>; 2]) -> Result<(), CodecError> {
        for slot in Slot::ALL {
            if !self.has_input(slot) {
                continue;
            }

            let expected = owners[slot.index()].ok_or(CodecError::UnresolvedInput { slot })?;

            if !self.is_signed(slot) {
                return Err(CodecError::MissingSignature { slot });
            }

            let actual = self.sender(slot)?;
            if actual != expected {
                return Err(CodecError::SignerMismatch {
                    slot,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("fee", &self.fee)
            .field("signed", &[self.is_signed(Slot::First), self.is_signed(Slot::Second)])
            .finish()
    }
}
