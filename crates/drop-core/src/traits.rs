//! Trait interfaces between crates.
//!
//! - [`DecayCalculator`]: time-based entitlement decay (drop-decay implements)

use crate::types::Value;

/// Direction in which a decayed amount is rounded.
///
/// The two directions are not interchangeable: payouts round down so the
/// pool never pays more than it holds, while the amount a burn must leave
/// behind rounds up so a burn never eats into a claimable entitlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Floor. Used for the amount paid to a claimant.
    Down,
    /// Ceiling. Used for the entitlement a burn must preserve.
    Up,
}

/// Pure computation of the currently claimable part of an entitlement.
///
/// `now` is a unix timestamp in seconds. Callers sample the clock once and
/// pass the same value to every call that must agree.
pub trait DecayCalculator: Send + Sync {
    /// Entitlement remaining at `now`, rounded as requested.
    ///
    /// Always within `[0, value]`.
    fn decayed_entitlement(&self, value: Value, now: u64, rounding: Rounding) -> Value;

    /// Amount a claimant holding `value` may withdraw at `now`.
    fn payout(&self, value: Value, now: u64) -> Value {
        self.decayed_entitlement(value, now, Rounding::Down)
    }

    /// Part of `value` a burn at `now` must leave in the pool.
    fn protected(&self, value: Value, now: u64) -> Value {
        self.decayed_entitlement(value, now, Rounding::Up)
    }
}
