//! Core data types: digests, addresses, and committed items.
//!
//! Values are unsigned 256-bit integers ([`Value`]) so that every amount a
//! uint256 token balance can hold is representable without loss.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::{ADDRESS_LEN, HASH_LEN};
use crate::error::ItemError;
use crate::hasher::keccak256;

/// Entitlement amount in the token's smallest unit.
pub type Value = primitive_types::U256;

/// A 32-byte Keccak-256 digest.
///
/// Used for leaf hashes, internal node hashes, and Merkle roots. Ordering is
/// lexicographic over the bytes, which is the order used when combining
/// sibling hashes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; HASH_LEN]);

impl Hash256 {
    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_LEN]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Hash256 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim();
        let cleaned = cleaned.strip_prefix("0x").unwrap_or(cleaned);
        let mut bytes = [0u8; HASH_LEN];
        hex::decode_to_slice(cleaned, &mut bytes)
            .map_err(|e| format!("invalid 32-byte hex digest {s:?}: {e}"))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A 20-byte account address in canonical (binary) form.
///
/// Text form is `0x` followed by 40 hex digits. Parsing accepts all-lowercase
/// and all-uppercase digits; mixed case must carry a valid EIP-55 checksum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Build an address from raw bytes, rejecting anything but exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ItemError> {
        let array: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| ItemError::InvalidAddressLength(bytes.len()))?;
        Ok(Self(array))
    }

    /// Parse an address that must be written in EIP-55 checksum case.
    pub fn from_checksummed(s: &str) -> Result<Self, ItemError> {
        let address: Address = s.parse()?;
        let trimmed = s.trim();
        if address.to_checksum() != trimmed {
            return Err(ItemError::InvalidChecksum(trimmed.to_string()));
        }
        Ok(address)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// EIP-55 mixed-case rendering, `0x`-prefixed.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(2 + 2 * ADDRESS_LEN);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let byte = digest.0[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if !cleaned.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ItemError::InvalidAddressHex(trimmed.to_string()));
        }
        let bytes = hex::decode(cleaned)
            .map_err(|e| ItemError::InvalidAddressHex(format!("{trimmed}: {e}")))?;
        let address = Self::from_slice(&bytes)?;

        let has_lower = cleaned.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = cleaned.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum()[2..] != *cleaned {
            return Err(ItemError::InvalidChecksum(trimmed.to_string()));
        }
        Ok(address)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a non-negative decimal value below 2^256.
///
/// Only ASCII digits are accepted: signs, hex and whitespace inside the
/// number are rejected.
pub fn parse_value(s: &str) -> Result<Value, ItemError> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ItemError::InvalidValue(trimmed.to_string()));
    }
    Value::from_dec_str(trimmed).map_err(|_| ItemError::ValueOverflow(trimmed.to_string()))
}

/// Serialize a [`Value`] as a decimal string, for `#[serde(serialize_with)]`.
///
/// JSON numbers cannot carry 256-bit integers losslessly.
pub fn as_decimal<S: Serializer>(value: &Value, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// One committed `(address, value)` pair.
///
/// Items order by address bytes first, then by value. That order fixes the
/// leaf sequence of every tree, which makes the root independent of input
/// order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub address: Address,
    pub value: Value,
}

impl Item {
    pub fn new(address: Address, value: Value) -> Self {
        Self { address, value }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.value)
    }
}
