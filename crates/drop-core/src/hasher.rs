//! Keccak-256 hashing for leaves and internal nodes.
//!
//! - Leaf hash: `keccak256(address || uint256_be(value))`
//! - Parent hash: `keccak256(min(a, b) || max(a, b))`
//!
//! Sorting the pair before hashing makes the parent hash symmetric, so a
//! proof is just a list of sibling hashes with no left/right markers. Both
//! encodings match what a Solidity verifier computes with `abi.encodePacked`.

use tiny_keccak::{Hasher, Keccak};

use crate::constants::{HASH_LEN, LEAF_PREIMAGE_LEN, VALUE_LEN};
use crate::types::{Hash256, Item};

/// Hash arbitrary bytes with Keccak-256.
pub fn keccak256(data: &[u8]) -> Hash256 {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; HASH_LEN];
    hasher.finalize(&mut output);
    Hash256(output)
}

/// Hash one committed item into its leaf digest.
pub fn compute_leaf_hash(item: &Item) -> Hash256 {
    let mut value_be = [0u8; VALUE_LEN];
    item.value.to_big_endian(&mut value_be);

    let mut preimage = [0u8; LEAF_PREIMAGE_LEN];
    preimage[..item.address.0.len()].copy_from_slice(item.address.as_bytes());
    preimage[item.address.0.len()..].copy_from_slice(&value_be);
    keccak256(&preimage)
}

/// Combine two sibling hashes into their parent. Argument order is irrelevant.
pub fn compute_parent_hash(a: &Hash256, b: &Hash256) -> Hash256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Keccak::v256();
    hasher.update(lo.as_bytes());
    hasher.update(hi.as_bytes());
    let mut output = [0u8; HASH_LEN];
    hasher.finalize(&mut output);
    Hash256(output)
}
