//! Shared fixtures for integration tests.

use drop_core::types::{Address, Item, Value};
use drop_decay::DecaySchedule;
use drop_service::AirdropData;

/// 01/01/2100 at 00:00.
pub const DECAY_START: u64 = 4_102_444_800;

/// Two years.
pub const DECAY_DURATION: u64 = 3600 * 24 * 365 * 2;

/// Address made of one repeated byte.
pub fn addr(byte: u8) -> Address {
    Address([byte; 20])
}

pub fn item(byte: u8, value: u64) -> Item {
    Item::new(addr(byte), Value::from(value))
}

/// Five items `0xAA.. → 1_000_000` through `0xEE.. → 5_000_000`.
pub fn tree_data() -> Vec<Item> {
    vec![
        item(0xAA, 1_000_000),
        item(0xBB, 2_000_000),
        item(0xCC, 3_000_000),
        item(0xDD, 4_000_000),
        item(0xEE, 5_000_000),
    ]
}

/// Three items of 33 each, small enough to expose rounding errors.
pub fn tree_data_small_values() -> Vec<Item> {
    vec![item(0xAA, 33), item(0xBB, 33), item(0xCC, 33)]
}

/// Items that are not part of [`tree_data`].
pub fn other_data() -> Vec<Item> {
    vec![item(0xFF, 6), item(0x00, 7)]
}

pub fn as_airdrop_data(items: &[Item]) -> AirdropData {
    items.iter().map(|i| (i.address, i.value)).collect()
}

pub fn schedule() -> DecaySchedule {
    DecaySchedule::new(DECAY_START, DECAY_DURATION)
}

/// Unix time at `percent` of the decay window.
pub fn at(percent: u64) -> u64 {
    DECAY_START + DECAY_DURATION * percent / 100
}
