//! The hashing and address-validation collaborator boundary.
//!
//! Selector derivation only needs a `hash(bytes) -> 32 bytes` capability;
//! the codec never implements the hash itself. `Keccak256` is the stock
//! implementation, injected by default everywhere a selector is computed.

use alloy_primitives::Address;
use std::str::FromStr;

/// A 32-byte hash capability.
pub trait Hasher {
    fn hash(&self, data: &[u8]) -> [u8; 32];
}

/// keccak256 via tiny-keccak.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256;

impl Hasher for Keccak256 {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        use tiny_keccak::Hasher as _;
        let mut hasher = tiny_keccak::Keccak::v256();
        let mut output = [0u8; 32];
        hasher.update(data);
        hasher.finalize(&mut output);
        output
    }
}

/// Whether `s` is a syntactically valid 20-byte hex address
/// (`0x` + 40 hex digits).
pub fn is_address(s: &str) -> bool {
    s.starts_with("0x") && Address::from_str(s).is_ok()
}
