//! # Core Entities
//!
//! Primitive aliases used across the child chain.

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 32-byte keccak256 hash.
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// The all-zero address. Marks an absent owner or an unsigned slot.
pub const NULL_ADDRESS: Address = [0u8; 20];

/// The all-zero hash.
pub const NULL_HASH: Hash = [0u8; 32];

/// Render an address as a `0x`-prefixed lowercase hex string.
pub fn address_to_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Parse a 20-byte address from hex, with or without the `0x` prefix.
pub fn address_from_hex(s: &str) -> Option<Address> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(trimmed).ok()?;
    if bytes.len() != 20 {
        return None;
    }
    let mut address = [0u8; 20];
    address.copy_from_slice(&bytes);
    Some(address)
}
