//! # drop-core
//! Foundation types and the Merkle commitment scheme for merkle drops.
//!
//! An airdrop is a set of `(address, value)` [`Item`](types::Item)s committed
//! to by a single Keccak-256 Merkle root. Anyone holding the root can check a
//! claim with [`validate_proof`](merkle::validate_proof) without the full set.

pub mod constants;
pub mod error;
pub mod hasher;
pub mod merkle;
pub mod traits;
pub mod types;

pub use merkle::{MerkleTree, build_tree, create_proof, validate_proof};
pub use types::{Address, Hash256, Item, Value};
