//! Cross-crate integration tests for merkle drop.
//!
//! Exercises the whole path from loaded airdrop data through tree
//! construction, proofs, snapshots, and pool accounting.

pub mod helpers;
