// src/utils/mod.rs
//! Utility functions for the Layer-2 security core
//!
//! Digest helpers shared by the batch chains and the bridge.

use sha2::{Digest, Sha256};

/// The empty digest
pub const ZERO_ROOT: [u8; 32] = [0; 32];

/// SHA-256 of arbitrary bytes
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute a hash of two 32-byte arrays
pub fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Left fold of `hash_pair` over `items`
///
/// Empty input hashes to [`ZERO_ROOT`]; a single item is returned as-is.
pub fn hash_multiple(items: &[[u8; 32]]) -> [u8; 32] {
    let Some((first, rest)) = items.split_first() else {
        return ZERO_ROOT;
    };

    rest.iter().fold(*first, |acc, item| hash_pair(&acc, item))
}

/// Whether a digest is the empty root
pub fn is_zero_root(root: &[u8; 32]) -> bool {
    root == &ZERO_ROOT
}

/// First eight bytes of a digest as hex, for log lines
pub fn short_hex(bytes: &[u8]) -> String {
    let end = bytes.len().min(8);
    hex::encode(&bytes[..end])
}
