//! Error types for merkle drops.
use thiserror::Error;

/// A malformed `(address, value)` pair. Never recoverable by retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("invalid address length: expected 20 bytes, got {0}")] InvalidAddressLength(usize),
    #[error("invalid address hex: {0}")] InvalidAddressHex(String),
    #[error("address is not in checksum case: {0}")] InvalidChecksum(String),
    #[error("expected decimal number as value, got {0:?}")] InvalidValue(String),
    #[error("value does not fit in 256 bits: {0}")] ValueOverflow(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("cannot build a merkle tree without items")] EmptyTree,
    #[error("item not in tree: {address} with value {value}")] ItemNotInTree { address: String, value: String },
    #[error("tree invariant violated: {0}")] InvariantViolation(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("the proof could not be verified")] InvalidProof,
    #[error("address already withdrew: {0}")] AlreadyWithdrawn(String),
    #[error("insufficient pool balance: have {have}, need {need}")] InsufficientBalance { have: String, need: String },
    #[error("decay has not finished: ends at {ends_at}, now {now}")] TooSoon { ends_at: u64, now: u64 },
    #[error("pool invariant violated: {0}")] InvariantViolation(String),
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("io: {0}")] Io(#[from] std::io::Error),
    #[error("line {line}: expected two values per line, got {got}")] MalformedLine { line: usize, got: usize },
    #[error("line {line}: {source}")] InvalidEntry { line: usize, source: ItemError },
    #[error("entry {entry} of the json object: {source}")] InvalidJsonEntry { entry: usize, source: ItemError },
    #[error("got address {0} multiple times")] DuplicateAddress(String),
    #[error("json: {0}")] Json(String),
}

#[derive(Error, Debug)]
pub enum DropError {
    #[error(transparent)] Item(#[from] ItemError),
    #[error(transparent)] Tree(#[from] TreeError),
    #[error(transparent)] Pool(#[from] PoolError),
    #[error(transparent)] Load(#[from] LoadError),
}
