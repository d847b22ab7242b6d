/* src/store/memory/mod.rs */

mod read;
mod unit;
mod write;

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use tokio::sync::Mutex;

#[cfg(feature = "events")]
use super::CounterEvent;
use super::{CounterStore, StoreError, UnitOfWork};
use crate::counter::Counter;
use unit::MemoryUnitOfWork;

/// Default event channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

pub(crate) struct Row {
	pub(crate) record: ArcSwap<Counter>,
	/// Row lock. Every write to the record happens while it is held.
	pub(crate) lock: Arc<Mutex<()>>,
}

impl Row {
	fn new(counter: Arc<Counter>) -> Self {
		Self {
			record: ArcSwap::new(counter),
			lock: Arc::new(Mutex::new(())),
		}
	}
}

/// In-process counter store with row locks and versioned records.
///
/// Reads are wait-free snapshots through `ArcSwap`; writes are serialized per
/// row by the row lock, which units of work hold until they end. The row map
/// itself is updated with RCU, so inserts and removals never block readers.
pub struct MemoryCounterStore {
	pub(crate) rows: ArcSwap<HashMap<String, Arc<Row>>>,
	#[cfg(feature = "events")]
	pub(crate) events: tokio::sync::broadcast::Sender<CounterEvent>,
}

impl MemoryCounterStore {
	/// Creates a new empty store with default event channel capacity.
	pub fn new() -> Self {
		Self {
			rows: ArcSwap::from_pointee(HashMap::new()),
			#[cfg(feature = "events")]
			events: tokio::sync::broadcast::channel(DEFAULT_EVENT_CAPACITY).0,
		}
	}

	/// Creates an empty store whose change channel buffers `capacity` events.
	///
	/// A subscriber that falls more than `capacity` writes behind misses the
	/// oldest counter changes and sees `RecvError::Lagged`.
	#[cfg(feature = "events")]
	pub fn with_event_capacity(capacity: usize) -> Self {
		Self {
			rows: ArcSwap::from_pointee(HashMap::new()),
			events: tokio::sync::broadcast::channel(capacity).0,
		}
	}

	fn row(&self, key: &str) -> Result<Arc<Row>, StoreError> {
		self.rows
			.load()
			.get(key)
			.cloned()
			.ok_or_else(|| StoreError::NotFound {
				key: key.to_string(),
			})
	}
}

impl Default for MemoryCounterStore {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for MemoryCounterStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryCounterStore")
			.field("rows", &self.len())
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
	async fn read(&self, key: &str) -> Result<Counter, StoreError> {
		let row = self.row(key)?;
		Ok(Counter::clone(&row.record.load()))
	}

	async fn write_if_version_matches(
		&self,
		key: &str,
		new_quantity: u64,
		expected_version: u64,
	) -> Result<Counter, StoreError> {
		let row = self.row(key)?;
		let _guard = row.lock.lock().await;

		let actual = row.record.load().version;
		if actual != expected_version {
			return Err(StoreError::VersionConflict {
				key: key.to_string(),
				expected: expected_version,
				actual,
			});
		}

		Ok(Counter::clone(&self.publish(&row, new_quantity)))
	}

	async fn write_exclusive(&self, key: &str, new_quantity: u64) -> Result<Counter, StoreError> {
		let row = self.row(key)?;
		let _guard = row.lock.lock().await;
		Ok(Counter::clone(&self.publish(&row, new_quantity)))
	}

	async fn begin<'a>(&'a self) -> Result<Box<dyn UnitOfWork + 'a>, StoreError> {
		Ok(Box::new(MemoryUnitOfWork::new(self)))
	}
}
