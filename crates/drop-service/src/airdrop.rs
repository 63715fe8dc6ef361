//! Airdrop data: the validated address → value mapping and its loaders.
//!
//! Two file formats are supported:
//! - CSV: one `address,value` pair per line, blank lines ignored.
//! - JSON: a single object `{ "0x…": value }`, values given as integers or
//!   decimal strings (strings are required above `u64::MAX`).
//!
//! Addresses must be unique. Mixed-case addresses must carry a valid EIP-55
//! checksum; values must be plain decimal numbers below 2^256.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use tracing::debug;

use drop_core::error::{ItemError, LoadError};
use drop_core::types::{Address, Item, Value, parse_value};

/// Entitlements keyed by address. Sorted, so iteration order is canonical.
pub type AirdropData = BTreeMap<Address, Value>;

/// All entries as committable items.
pub fn to_items(data: &AirdropData) -> Vec<Item> {
    data.iter()
        .map(|(address, value)| Item::new(*address, *value))
        .collect()
}

/// The item for `address`, if it is part of the airdrop.
pub fn get_item(address: &Address, data: &AirdropData) -> Option<Item> {
    data.get(address).map(|value| Item::new(*address, *value))
}

/// Entitlement of `address`; zero when absent.
pub fn get_balance(address: &Address, data: &AirdropData) -> Value {
    data.get(address).copied().unwrap_or_default()
}

/// Total of all entitlements, i.e. the amount the pool must be funded with.
///
/// Returns `None` if the total does not fit in 256 bits.
pub fn sum_of_values(data: &AirdropData) -> Option<Value> {
    data.values()
        .try_fold(Value::zero(), |acc, value| acc.checked_add(*value))
}

/// Load an airdrop file, choosing the format from its extension.
pub fn load_airdrop_file(path: &Path) -> Result<AirdropData, LoadError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json { load_json(path) } else { load_csv(path) }
}

/// Load a CSV airdrop file.
pub fn load_csv(path: &Path) -> Result<AirdropData, LoadError> {
    let contents = fs::read_to_string(path)?;
    let data = parse_csv(&contents)?;
    debug!(path = %path.display(), entries = data.len(), "Loaded CSV airdrop file");
    Ok(data)
}

/// Load a JSON airdrop file.
pub fn load_json(path: &Path) -> Result<AirdropData, LoadError> {
    let contents = fs::read_to_string(path)?;
    let data = parse_json(&contents)?;
    debug!(path = %path.display(), entries = data.len(), "Loaded JSON airdrop file");
    Ok(data)
}

/// Parse CSV text into validated airdrop data.
pub fn parse_csv(contents: &str) -> Result<AirdropData, LoadError> {
    let mut data = AirdropData::new();
    for (index, line) in contents.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [address, value] = fields[..] else {
            return Err(LoadError::MalformedLine {
                line: line_no,
                got: fields.len(),
            });
        };

        let address: Address = address.parse().map_err(|source| LoadError::InvalidEntry {
            line: line_no,
            source,
        })?;
        let value = parse_value(value).map_err(|source| LoadError::InvalidEntry {
            line: line_no,
            source,
        })?;
        insert_unique(&mut data, address, value)?;
    }
    Ok(data)
}

/// Parse a JSON object into validated airdrop data.
///
/// Entries are validated in file order. A key repeated verbatim is a
/// duplicate like any other, it does not silently overwrite the first.
pub fn parse_json(contents: &str) -> Result<AirdropData, LoadError> {
    let JsonEntries(entries) =
        serde_json::from_str(contents).map_err(|e| LoadError::Json(e.to_string()))?;

    let mut data = AirdropData::new();
    for (index, (address, value)) in entries.into_iter().enumerate() {
        let entry = index + 1;
        let address: Address = address
            .parse()
            .map_err(|source| LoadError::InvalidJsonEntry { entry, source })?;
        let value =
            json_value(&value).map_err(|source| LoadError::InvalidJsonEntry { entry, source })?;
        insert_unique(&mut data, address, value)?;
    }
    Ok(data)
}

/// Top-level JSON object, read pair by pair so no key is dropped.
struct JsonEntries(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for JsonEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = JsonEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping addresses to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsonEntries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, serde_json::Value>()? {
                    entries.push(entry);
                }
                Ok(JsonEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn json_value(value: &serde_json::Value) -> Result<Value, ItemError> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(Value::from)
            .ok_or_else(|| ItemError::InvalidValue(n.to_string())),
        serde_json::Value::String(s) => parse_value(s),
        other => Err(ItemError::InvalidValue(other.to_string())),
    }
}

fn insert_unique(data: &mut AirdropData, address: Address, value: Value) -> Result<(), LoadError> {
    if data.insert(address, value).is_some() {
        return Err(LoadError::DuplicateAddress(address.to_string()));
    }
    Ok(())
}
