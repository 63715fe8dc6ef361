//! Published airdrop snapshots.
//!
//! An [`AirdropSnapshot`] is the read-only context every request works
//! against. It is fully built before anyone can see it, and never mutated
//! afterwards. [`SnapshotHandle`] publishes the current snapshot and swaps in
//! a replacement atomically: a reader holds an `Arc` to exactly one
//! snapshot for the whole of its computation.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

use drop_core::error::{DropError, TreeError};
use drop_core::merkle::MerkleTree;
use drop_core::traits::DecayCalculator;
use drop_core::types::{Address, Hash256, Item, Value, as_decimal};
use drop_decay::DecaySchedule;

use crate::airdrop::{AirdropData, get_balance, get_item, to_items};

/// What a claimant is owed right now, with the proof to claim it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    pub address: Address,
    #[serde(serialize_with = "as_decimal")]
    pub original_entitlement: Value,
    #[serde(serialize_with = "as_decimal")]
    pub current_entitlement: Value,
    pub proof: Vec<Hash256>,
}

/// Airdrop data, its Merkle tree, and the decay schedule, built once.
#[derive(Debug)]
pub struct AirdropSnapshot {
    data: AirdropData,
    tree: MerkleTree,
    schedule: DecaySchedule,
}

impl AirdropSnapshot {
    /// Build the tree for `data` and bundle it with `schedule`.
    pub fn build(data: AirdropData, schedule: DecaySchedule) -> Result<Self, DropError> {
        let tree = MerkleTree::build(to_items(&data))?;
        info!(
            root = %tree.root(),
            leaves = tree.leaf_count(),
            decay_start = schedule.start,
            decay_duration = schedule.duration,
            "Built airdrop snapshot"
        );
        Ok(Self {
            data,
            tree,
            schedule,
        })
    }

    pub fn root(&self) -> Hash256 {
        self.tree.root()
    }

    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    pub fn data(&self) -> &AirdropData {
        &self.data
    }

    pub fn schedule(&self) -> DecaySchedule {
        self.schedule
    }

    /// Undecayed entitlement of `address`; zero when absent.
    pub fn balance(&self, address: &Address) -> Value {
        get_balance(address, &self.data)
    }

    pub fn item(&self, address: &Address) -> Option<Item> {
        get_item(address, &self.data)
    }

    /// Proof for `address`, or `None` if it has nothing to claim.
    ///
    /// Errors only if the tree disagrees with the data it was built from.
    pub fn proof_for(&self, address: &Address) -> Result<Option<Vec<Hash256>>, TreeError> {
        match self.item(address) {
            Some(item) if !item.value.is_zero() => self.tree.proof(&item).map(Some),
            _ => Ok(None),
        }
    }

    /// Read model for `address` at `now`; `None` means not eligible.
    pub fn entitlement(&self, address: &Address, now: u64) -> Result<Option<Entitlement>, TreeError> {
        let Some(proof) = self.proof_for(address)? else {
            return Ok(None);
        };
        let original = self.balance(address);
        Ok(Some(Entitlement {
            address: *address,
            original_entitlement: original,
            current_entitlement: self.schedule.payout(original, now),
            proof,
        }))
    }
}

/// Shared slot holding the currently published snapshot.
#[derive(Debug)]
pub struct SnapshotHandle {
    current: RwLock<Arc<AirdropSnapshot>>,
}

impl SnapshotHandle {
    pub fn new(snapshot: AirdropSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot readers should use. The lock is held only to clone the `Arc`.
    pub fn current(&self) -> Arc<AirdropSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Publish `snapshot`, returning the one it replaces.
    pub fn replace(&self, snapshot: AirdropSnapshot) -> Arc<AirdropSnapshot> {
        let next = Arc::new(snapshot);
        let root = next.root();
        let previous = std::mem::replace(&mut *self.current.write(), next);
        info!(old_root = %previous.root(), new_root = %root, "Replaced airdrop snapshot");
        previous
    }
}
