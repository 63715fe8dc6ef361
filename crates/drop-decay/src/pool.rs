//! Escrow accounting for a merkle drop.
//!
//! A [`DropPool`] holds the tokens of one airdrop. Claimants withdraw their
//! decayed entitlement by presenting a proof against the committed root;
//! anyone may burn the part of the pool that has decayed away.
//!
//! Two quantities drive the accounting:
//! - `remaining_value`: sum of the *undecayed* entitlements of everyone who
//!   has not withdrawn yet.
//! - `balance`: tokens actually held, `initial_balance - spent_tokens`.
//!
//! A burn keeps `decayed(remaining_value, Up)` in the pool. Each payout is
//! `decayed(value, Down)`. Because the ceiling of a sum is never below the sum
//! of floors, every outstanding claimant can still be paid after any burn.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use drop_core::error::PoolError;
use drop_core::merkle::validate_proof;
use drop_core::traits::DecayCalculator;
use drop_core::types::{Address, Hash256, Item, Value, as_decimal};

use crate::linear::DecaySchedule;

/// Snapshot of a pool's accounting, as reported to operators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub root: Hash256,
    pub decay_start_time: u64,
    pub decay_duration_in_seconds: u64,
    #[serde(serialize_with = "as_decimal")]
    pub initial_balance: Value,
    #[serde(serialize_with = "as_decimal")]
    pub remaining_value: Value,
    #[serde(serialize_with = "as_decimal")]
    pub spent_tokens: Value,
    #[serde(serialize_with = "as_decimal")]
    pub balance: Value,
    #[serde(serialize_with = "as_decimal")]
    pub decayed_remaining_value: Value,
}

/// Ledger of one airdrop's escrowed tokens.
#[derive(Clone, Debug)]
pub struct DropPool {
    root: Hash256,
    schedule: DecaySchedule,
    initial_balance: Value,
    remaining_value: Value,
    spent_tokens: Value,
    withdrawn: HashSet<Address>,
}

impl DropPool {
    /// Create a pool funded with `initial_balance`, which must equal the sum
    /// of all committed entitlements.
    pub fn new(root: Hash256, initial_balance: Value, schedule: DecaySchedule) -> Self {
        Self {
            root,
            schedule,
            initial_balance,
            remaining_value: initial_balance,
            spent_tokens: Value::zero(),
            withdrawn: HashSet::new(),
        }
    }

    pub fn root(&self) -> Hash256 {
        self.root
    }

    pub fn schedule(&self) -> DecaySchedule {
        self.schedule
    }

    /// Tokens currently held by the pool.
    pub fn balance(&self) -> Value {
        // spent_tokens never exceeds initial_balance: every debit is checked.
        self.initial_balance.saturating_sub(self.spent_tokens)
    }

    pub fn remaining_value(&self) -> Value {
        self.remaining_value
    }

    pub fn spent_tokens(&self) -> Value {
        self.spent_tokens
    }

    pub fn has_withdrawn(&self, address: &Address) -> bool {
        self.withdrawn.contains(address)
    }

    /// Whether `(address, value)` is committed under this pool's root.
    pub fn verify_entitlement(&self, address: Address, value: Value, proof: &[Hash256]) -> bool {
        validate_proof(&Item::new(address, value), proof, &self.root)
    }

    /// Withdraw the decayed entitlement of `address` at `now`.
    ///
    /// Returns the amount paid out, which is rounded down.
    pub fn withdraw(
        &mut self,
        address: Address,
        value: Value,
        proof: &[Hash256],
        now: u64,
    ) -> Result<Value, PoolError> {
        if !self.verify_entitlement(address, value, proof) {
            return Err(PoolError::InvalidProof);
        }
        if self.withdrawn.contains(&address) {
            return Err(PoolError::AlreadyWithdrawn(address.to_string()));
        }

        let payout = self.schedule.payout(value, now);
        let balance = self.balance();
        if balance < payout {
            return Err(PoolError::InsufficientBalance {
                have: balance.to_string(),
                need: payout.to_string(),
            });
        }
        let remaining_value = self.remaining_value.checked_sub(value).ok_or_else(|| {
            PoolError::InvariantViolation(format!(
                "entitlement {value} exceeds remaining value {}",
                self.remaining_value
            ))
        })?;

        self.withdrawn.insert(address);
        self.remaining_value = remaining_value;
        self.spent_tokens = self.spent_tokens.saturating_add(payout);

        info!(%address, %value, %payout, "Withdraw");
        Ok(payout)
    }

    /// Burn every token no outstanding claimant can still withdraw at `now`.
    ///
    /// Returns the amount burned. Before decay starts nothing is burnable.
    pub fn burn_unusable(&mut self, now: u64) -> Result<Value, PoolError> {
        if !self.schedule.has_started(now) {
            debug!(now, start = self.schedule.start, "Decay not started, nothing to burn");
            return Ok(Value::zero());
        }

        let target = self.schedule.protected(self.remaining_value, now);
        let balance = self.balance();
        let to_burn = balance.checked_sub(target).ok_or_else(|| {
            PoolError::InvariantViolation(format!(
                "pool holds {balance} but must keep {target}"
            ))
        })?;

        self.spent_tokens = self.spent_tokens.saturating_add(to_burn);
        info!(burned = %to_burn, kept = %target, "Burned unusable tokens");
        Ok(to_burn)
    }

    /// Check that the pool may be wound down: only once decay has finished.
    pub fn close(&self, now: u64) -> Result<Value, PoolError> {
        if !self.schedule.has_finished(now) {
            return Err(PoolError::TooSoon {
                ends_at: self.schedule.end(),
                now,
            });
        }
        Ok(self.balance())
    }

    pub fn status(&self, now: u64) -> PoolStatus {
        PoolStatus {
            root: self.root,
            decay_start_time: self.schedule.start,
            decay_duration_in_seconds: self.schedule.duration,
            initial_balance: self.initial_balance,
            remaining_value: self.remaining_value,
            spent_tokens: self.spent_tokens,
            balance: self.balance(),
            decayed_remaining_value: self.schedule.protected(self.remaining_value, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drop_core::merkle::{MerkleTree, build_tree};

    const START: u64 = 4_102_444_800;
    const DURATION: u64 = 3600 * 24 * 365 * 2;

    fn at(fraction_percent: u64) -> u64 {
        START + DURATION * fraction_percent / 100
    }

    fn tree_data() -> Vec<Item> {
        [0xAA, 0xBB, 0xCC, 0xDD, 0xEE]
            .into_iter()
            .zip(1u64..)
            .map(|(b, i)| Item::new(Address([b; 20]), Value::from(i * 1_000_000)))
            .collect()
    }

    fn pool_for(items: &[Item]) -> (DropPool, MerkleTree) {
        let tree = build_tree(items.to_vec()).unwrap();
        let total = items.iter().fold(Value::zero(), |acc, i| acc + i.value);
        let pool = DropPool::new(tree.root(), total, DecaySchedule::new(START, DURATION));
        (pool, tree)
    }

    fn withdraw(pool: &mut DropPool, tree: &MerkleTree, item: &Item, now: u64) -> Result<Value, PoolError> {
        let proof = tree.proof(item).unwrap();
        pool.withdraw(item.address, item.value, &proof, now)
    }

    #[test]
    fn proof_entitlement() {
        let items = tree_data();
        let (pool, tree) = pool_for(&items);
        for i in &items {
            let proof = tree.proof(i).unwrap();
            assert!(pool.verify_entitlement(i.address, i.value, &proof));
            assert!(!pool.verify_entitlement(i.address, i.value + 1, &proof));
        }
    }

    #[test]
    fn withdraw_before_decay_pays_full_value() {
        let items = tree_data();
        let (mut pool, tree) = pool_for(&items);
        let paid = withdraw(&mut pool, &tree, &items[0], START - 1).unwrap();
        assert_eq!(paid, Value::from(1_000_000u64));
        assert_eq!(pool.balance(), Value::from(14_000_000u64));
        assert!(pool.has_withdrawn(&items[0].address));
    }

    #[test]
    fn withdraw_twice_rejected() {
        let items = tree_data();
        let (mut pool, tree) = pool_for(&items);
        withdraw(&mut pool, &tree, &items[0], START).unwrap();
        assert!(matches!(
            withdraw(&mut pool, &tree, &items[0], START),
            Err(PoolError::AlreadyWithdrawn(_))
        ));
    }

    #[test]
    fn withdraw_wrong_proof_rejected() {
        let items = tree_data();
        let (mut pool, tree) = pool_for(&items);
        let wrong = tree.proof(&items[1]).unwrap();
        assert_eq!(
            pool.withdraw(items[0].address, items[0].value, &wrong, START),
            Err(PoolError::InvalidProof)
        );
        assert_eq!(pool.spent_tokens(), Value::zero());
    }

    #[test]
    fn withdraw_with_decay() {
        for (percent, expected) in [(0, 1_000_000u64), (25, 750_000), (50, 500_000), (75, 250_000)] {
            let items = tree_data();
            let (mut pool, tree) = pool_for(&items);
            let paid = withdraw(&mut pool, &tree, &items[0], at(percent)).unwrap();
            assert_eq!(paid, Value::from(expected), "percent={percent}");
        }
    }

    #[test]
    fn withdraw_after_decay_pays_nothing() {
        let items = tree_data();
        let (mut pool, tree) = pool_for(&items);
        assert_eq!(withdraw(&mut pool, &tree, &items[0], at(200)).unwrap(), Value::zero());
    }

    #[test]
    fn burn_unusable_tokens() {
        for percent in [0u64, 25, 50, 75, 100] {
            let items = tree_data();
            let (mut pool, _) = pool_for(&items);
            pool.burn_unusable(at(percent)).unwrap();
            let expected = Value::from(15_000_000u64 * (100 - percent) / 100);
            assert_eq!(pool.balance(), expected, "percent={percent}");
        }
    }

    #[test]
    fn burn_after_decay_empties_pool() {
        let items = tree_data();
        let (mut pool, _) = pool_for(&items);
        pool.burn_unusable(at(200)).unwrap();
        assert_eq!(pool.balance(), Value::zero());
    }

    #[test]
    fn burn_enough_tokens() {
        let items = tree_data();
        let (mut pool, tree) = pool_for(&items);
        withdraw(&mut pool, &tree, &items[0], at(50)).unwrap();
        pool.burn_unusable(at(50)).unwrap();
        assert_eq!(pool.balance(), Value::from((15_000_000u64 - 1_000_000) / 2));
    }

    #[test]
    fn everyone_can_withdraw_after_burns() {
        let items = tree_data();
        let (mut pool, tree) = pool_for(&items);
        pool.burn_unusable(at(25)).unwrap();
        withdraw(&mut pool, &tree, &items[0], at(50)).unwrap();
        pool.burn_unusable(at(75)).unwrap();
        for i in &items[1..] {
            withdraw(&mut pool, &tree, i, at(75)).unwrap();
        }
        pool.burn_unusable(at(100)).unwrap();
        assert_eq!(pool.balance(), Value::zero());
        assert_eq!(pool.remaining_value(), Value::zero());
    }

    #[test]
    fn rounding_keeps_claimants_whole() {
        let items: Vec<Item> = [0xAA, 0xBB, 0xCC]
            .into_iter()
            .map(|b| Item::new(Address([b; 20]), Value::from(33u64)))
            .collect();
        let (mut pool, tree) = pool_for(&items);

        let burned = pool.burn_unusable(at(50)).unwrap();
        assert_eq!(burned, Value::from(49u64));
        assert_eq!(pool.balance(), Value::from(50u64));

        for i in &items[1..] {
            assert_eq!(withdraw(&mut pool, &tree, i, at(50)).unwrap(), Value::from(16u64));
        }
    }

    #[test]
    fn close_only_after_decay() {
        let items = tree_data();
        let (pool, _) = pool_for(&items);
        assert!(matches!(pool.close(at(50)), Err(PoolError::TooSoon { .. })));
        assert_eq!(pool.close(at(100)).unwrap(), Value::from(15_000_000u64));
    }

    #[test]
    fn status_reports_ledger() {
        let items = tree_data();
        let (mut pool, tree) = pool_for(&items);
        withdraw(&mut pool, &tree, &items[0], at(50)).unwrap();
        let status = pool.status(at(50));
        assert_eq!(status.root, tree.root());
        assert_eq!(status.spent_tokens, Value::from(500_000u64));
        assert_eq!(status.remaining_value, Value::from(14_000_000u64));
        assert_eq!(status.decayed_remaining_value, Value::from(7_000_000u64));
        assert_eq!(status.balance, Value::from(14_500_000u64));
    }
}
