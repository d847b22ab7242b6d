/* src/store/mod.rs */

//!
//! Durable keyed storage for counters.
//!
//! [`CounterStore`] is the narrow contract the lock strategies consume:
//! plain reads, compare-and-swap writes, plain exclusive writes, and units
//! of work whose reads can take the store's native row lock.

mod error;
#[cfg(feature = "events")]
mod event;
#[cfg(feature = "memory")]
mod memory;

pub use error::StoreError;
#[cfg(feature = "events")]
pub use event::CounterEvent;
#[cfg(feature = "memory")]
pub use memory::{DEFAULT_EVENT_CAPACITY, MemoryCounterStore};

use async_trait::async_trait;

use crate::counter::Counter;

/// Shared storage of `(quantity, version)` records.
#[async_trait]
pub trait CounterStore: Send + Sync {
	/// Reads the committed counter.
	async fn read(&self, key: &str) -> Result<Counter, StoreError>;

	/// Writes `new_quantity` only if the committed version equals `expected_version`.
	///
	/// Fails with [`StoreError::VersionConflict`] otherwise.
	async fn write_if_version_matches(
		&self,
		key: &str,
		new_quantity: u64,
		expected_version: u64,
	) -> Result<Counter, StoreError>;

	/// Writes `new_quantity` unconditionally.
	///
	/// Callers are expected to already hold exclusive access to the key.
	async fn write_exclusive(&self, key: &str, new_quantity: u64) -> Result<Counter, StoreError>;

	/// Opens a unit of work.
	async fn begin<'a>(&'a self) -> Result<Box<dyn UnitOfWork + 'a>, StoreError>;
}

/// A transaction against a [`CounterStore`].
///
/// Writes become visible to other readers only on [`commit`](UnitOfWork::commit).
/// Dropping an uncommitted unit rolls it back and releases every row lock it holds.
#[async_trait]
pub trait UnitOfWork: Send {
	/// Reads without locking. Sees this unit's own staged writes.
	async fn read(&mut self, key: &str) -> Result<Counter, StoreError>;

	/// Reads and takes the row lock, blocking other exclusive readers and
	/// writers of the key until this unit ends.
	async fn read_for_exclusive_access(&mut self, key: &str) -> Result<Counter, StoreError>;

	/// Stages a write. Takes the row lock if it is not already held.
	async fn write(&mut self, key: &str, new_quantity: u64) -> Result<(), StoreError>;

	/// Publishes staged writes and releases row locks.
	async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
