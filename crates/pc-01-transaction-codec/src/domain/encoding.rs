//! # Transaction Encoding
//!
//! RLP layouts shared with the root-chain contract.
//!
//! Unsigned (hashed) form, 11 items:
//!
//! ```text
//! [blknum1, txindex1, oindex1, blknum2, txindex2, oindex2,
//!  newowner1, amount1, newowner2, amount2, fee]
//! ```
//!
//! The signed wire form appends `sig1, sig2` (13 items). Integers use the
//! minimal big-endian encoding; owners are always 20 raw bytes.

use rlp::{Rlp, RlpStream};
use shared_types::{Address, UtxoPosition, U256};

use super::entities::{Signature, Transaction, TxOutput, NULL_SIGNATURE, SIGNATURE_LENGTH};
use super::errors::CodecError;

/// Item count of the unsigned layout.
pub const UNSIGNED_FIELD_COUNT: usize = 11;

/// Item count of the signed layout.
pub const SIGNED_FIELD_COUNT: usize = 13;

pub fn encode_unsigned(tx: &Transaction) -> Vec<u8> {
    let mut stream = RlpStream::new_list(UNSIGNED_FIELD_COUNT);
    append_body(&mut stream, tx);
    stream.out().to_vec()
}

pub fn encode_signed(tx: &Transaction) -> Vec<u8> {
    let mut stream = RlpStream::new_list(SIGNED_FIELD_COUNT);
    append_body(&mut stream, tx);
    for signature in &tx.signatures {
        stream.append(&signature.to_vec());
    }
    stream.out().to_vec()
}

fn append_body(stream: &mut RlpStream, tx: &Transaction) {
    for input in &tx.inputs {
        stream.append(&input.blknum());
        stream.append(&u64::from(input.txindex()));
        stream.append(&u64::from(input.oindex()));
    }
    for output in &tx.outputs {
        stream.append(&output.owner.to_vec());
        stream.append(&output.amount);
    }
    stream.append(&tx.fee);
}

/// Decode the unsigned or signed layout. An unsigned payload yields a
/// transaction with both slots unsigned.
pub fn decode(bytes: &[u8]) -> Result<Transaction, CodecError> {
    let rlp = Rlp::new(bytes);
    if !rlp.is_list() {
        return Err(CodecError::Rlp("expected list".into()));
    }

    let info = rlp.payload_info()?;
    if info.header_len.checked_add(info.value_len) != Some(bytes.len()) {
        return Err(CodecError::Rlp("trailing bytes after list".into()));
    }

    let count = rlp.item_count()?;
    if count != UNSIGNED_FIELD_COUNT && count != SIGNED_FIELD_COUNT {
        return Err(CodecError::InvalidFieldCount(count));
    }

    let inputs = [decode_input(&rlp, 0)?, decode_input(&rlp, 3)?];
    let outputs = [decode_output(&rlp, 6)?, decode_output(&rlp, 8)?];
    let fee: U256 = rlp.val_at(10)?;

    let signatures = if count == SIGNED_FIELD_COUNT {
        [decode_signature(&rlp, 11)?, decode_signature(&rlp, 12)?]
    } else {
        [NULL_SIGNATURE; 2]
    };

    Ok(Transaction {
        inputs,
        outputs,
        fee,
        signatures,
    })
}

fn decode_input(rlp: &Rlp<'_>, offset: usize) -> Result<UtxoPosition, CodecError> {
    let blknum: u64 = rlp.val_at(offset)?;
    let txindex: u64 = rlp.val_at(offset + 1)?;
    let oindex: u64 = rlp.val_at(offset + 2)?;

    let txindex =
        u32::try_from(txindex).map_err(|_| CodecError::FieldOutOfRange { field: "txindex" })?;
    let oindex =
        u16::try_from(oindex).map_err(|_| CodecError::FieldOutOfRange { field: "oindex" })?;

    Ok(UtxoPosition::new(blknum, txindex, oindex)?)
}

fn decode_output(rlp: &Rlp<'_>, offset: usize) -> Result<TxOutput, CodecError> {
    let owner = decode_address(rlp, offset)?;
    let amount: U256 = rlp.val_at(offset + 1)?;
    Ok(TxOutput { owner, amount })
}

fn decode_address(rlp: &Rlp<'_>, index: usize) -> Result<Address, CodecError> {
    let item = rlp.at(index)?;
    let data = item.data()?;
    if data.len() != 20 {
        return Err(CodecError::InvalidAddressLength(data.len()));
    }
    let mut address = [0u8; 20];
    address.copy_from_slice(data);
    Ok(address)
}

fn decode_signature(rlp: &Rlp<'_>, index: usize) -> Result<Signature, CodecError> {
    let item = rlp.at(index)?;
    let data = item.data()?;
    if data.len() != SIGNATURE_LENGTH {
        return Err(CodecError::InvalidSignatureLength(data.len()));
    }
    let mut signature = [0u8; SIGNATURE_LENGTH];
    signature.copy_from_slice(data);
    Ok(signature)
}
