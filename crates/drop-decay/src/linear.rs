//! Linear decay schedule implementing the [`DecayCalculator`] trait.
//!
//! Between `start` and `start + duration` an entitlement `v` is worth
//! `v * (start + duration - now) / duration`. The product is computed exactly
//! in 512-bit arithmetic, so no precision is lost for any 256-bit value.

use std::time::{SystemTime, UNIX_EPOCH};

use primitive_types::U512;
use serde::{Deserialize, Serialize};

use drop_core::traits::{DecayCalculator, Rounding};
use drop_core::types::Value;

/// Current unix time in seconds. Sample once per operation.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Entitlement left from `value` at `now` under linear decay.
///
/// Returns `value` up to and including `decay_start`, zero from
/// `decay_start + decay_duration` on, and the linearly interpolated amount in
/// between, rounded up when `round_up` is set and down otherwise.
///
/// # Panics
///
/// Panics if the result ever falls outside `[0, value]`. That cannot happen
/// for correct arithmetic and must not be handled as a recoverable error.
pub fn decayed_entitlement(
    value: Value,
    now: u64,
    decay_start: u64,
    decay_duration: u64,
    round_up: bool,
) -> Value {
    let end = decay_start as u128 + decay_duration as u128;
    if now <= decay_start {
        return value;
    }
    if now as u128 >= end {
        return Value::zero();
    }

    // decay_start < now < end, hence 0 < remaining < decay_duration.
    let remaining = end - now as u128;
    let numerator = value.full_mul(Value::from(remaining));
    let (mut scaled, rest) = numerator.div_mod(U512::from(decay_duration));
    if round_up && !rest.is_zero() {
        scaled += U512::one();
    }

    match Value::try_from(scaled).ok().filter(|r| *r <= value) {
        Some(result) => result,
        None => panic!("decayed entitlement {scaled} exceeds original value {value}"),
    }
}

/// Linear decay window, in unix seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DecaySchedule {
    /// Time at which decay begins.
    pub start: u64,
    /// Seconds until entitlements reach zero.
    pub duration: u64,
}

impl DecaySchedule {
    pub fn new(start: u64, duration: u64) -> Self {
        Self { start, duration }
    }

    /// First instant at which every entitlement is zero.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.duration)
    }

    pub fn has_started(&self, now: u64) -> bool {
        now > self.start
    }

    pub fn has_finished(&self, now: u64) -> bool {
        now as u128 >= self.start as u128 + self.duration as u128
    }
}

impl DecayCalculator for DecaySchedule {
    fn decayed_entitlement(&self, value: Value, now: u64, rounding: Rounding) -> Value {
        decayed_entitlement(
            value,
            now,
            self.start,
            self.duration,
            rounding == Rounding::Up,
        )
    }
}
