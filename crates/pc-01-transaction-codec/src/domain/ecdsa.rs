//! # ECDSA (secp256k1)
//!
//! Keccak256 hashing, recoverable signing and signer recovery.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: high-S signatures are rejected on
//!   recovery and never produced on signing
//! - Signatures are computed over a 32-byte prehash; no extra message prefix
//!   is applied, matching the root-chain `ecrecover` usage

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use shared_types::{Address, Hash};

use super::entities::{Signature, SIGNATURE_LENGTH};
use super::errors::SignatureError;

/// Offset added to the recovery id in the `v` byte.
const V_OFFSET: u8 = 27;

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Sign a 32-byte hash, producing `r || s || v`.
pub fn sign_hash(hash: &Hash, key: &SigningKey) -> Result<Signature, SignatureError> {
    let (mut sig, mut recid) = key
        .sign_prehash_recoverable(hash)
        .map_err(|_| SignatureError::SigningFailed)?;

    // Normalize S to low value (EIP-2), flipping the y-parity of R
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recid = RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced());
    }

    let mut out = [0u8; SIGNATURE_LENGTH];
    out[..64].copy_from_slice(&sig.to_bytes());
    out[64] = recid.to_byte() + V_OFFSET;
    Ok(out)
}

/// Recover the signer's address from a 65-byte signature over `hash`.
pub fn recover_address(hash: &Hash, signature: &Signature) -> Result<Address, SignatureError> {
    let recovery_id = parse_recovery_id(signature[64])?;

    let sig =
        EcdsaSignature::from_slice(&signature[..64]).map_err(|_| SignatureError::InvalidFormat)?;

    if sig.normalize_s().is_some() {
        return Err(SignatureError::MalleableSignature);
    }

    let recovered_key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Derive Ethereum address from public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let pubkey_slice = pubkey_bytes.as_bytes();

    // Keccak256 hash of public key (without 0x04 prefix)
    let hash = keccak256(&pubkey_slice[1..]);

    // Take last 20 bytes as address
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Address controlled by a signing key.
pub fn address_from_signing_key(key: &SigningKey) -> Address {
    address_from_pubkey(key.verifying_key())
}

/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id: u8 = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}
