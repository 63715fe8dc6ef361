//! # drop-service
//! Loading airdrop files and publishing immutable snapshots to readers.
//!
//! A snapshot bundles the validated airdrop data, the Merkle tree built from
//! it, and the decay schedule. It is built once, then shared read-only
//! through a [`SnapshotHandle`] that can swap in a replacement atomically.

pub mod airdrop;
pub mod snapshot;

pub use airdrop::{AirdropData, load_airdrop_file, load_csv, load_json};
pub use snapshot::{AirdropSnapshot, Entitlement, SnapshotHandle};
