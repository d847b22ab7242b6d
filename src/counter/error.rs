/* src/counter/error.rs */

/// The requested amount exceeds the units available.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("insufficient stock for {key}: {available} available, {requested} requested")]
pub struct InsufficientStock {
	pub key: String,
	pub available: u64,
	pub requested: u64,
}
