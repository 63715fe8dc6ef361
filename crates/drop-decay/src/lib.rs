//! # drop-decay: linear entitlement decay and drop pool accounting.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! - **Linear decay**: an entitlement is claimable in full until the decay
//!   start, then shrinks linearly to zero over the decay duration.
//! - **Asymmetric rounding**: payouts round down, the amount a burn must
//!   preserve rounds up. Together they guarantee that burning never removes
//!   tokens some claimant could still withdraw.
//! - **Drop pool**: the escrow ledger (withdraw, burn, close) that the
//!   rounding rules protect.

pub mod linear;
pub mod pool;

pub use linear::{DecaySchedule, decayed_entitlement, unix_now};
pub use pool::{DropPool, PoolStatus};
