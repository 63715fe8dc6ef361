//! Protocol constants shared by every crate in the workspace.

/// Length of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Length of a Keccak-256 digest in bytes.
pub const HASH_LEN: usize = 32;

/// Width of an item value in its leaf encoding (uint256, big-endian).
pub const VALUE_LEN: usize = 32;

/// Number of bytes hashed to produce a leaf: address followed by value.
pub const LEAF_PREIMAGE_LEN: usize = ADDRESS_LEN + VALUE_LEN;
