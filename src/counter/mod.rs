/* src/counter/mod.rs */

mod decrement;
mod error;

pub use decrement::apply;
pub use error::InsufficientStock;

/// One stock line as persisted by a [`CounterStore`](crate::store::CounterStore).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Counter {
	/// Opaque identifier of the stock line.
	pub key: String,
	/// Units currently available.
	pub quantity: u64,
	/// Incremented on every successful write.
	pub version: u64,
}

impl Counter {
	/// Creates a counter at version zero.
	pub fn new(key: impl Into<String>, quantity: u64) -> Self {
		Self {
			key: key.into(),
			quantity,
			version: 0,
		}
	}
}
