/* src/store/memory/unit.rs */

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use super::super::{StoreError, UnitOfWork};
use super::{MemoryCounterStore, Row};
use crate::counter::Counter;

/// A unit of work over [`MemoryCounterStore`].
///
/// Row locks are taken by locking reads and by writes and are held until the
/// unit is committed or dropped. Staged writes are discarded on drop.
pub(crate) struct MemoryUnitOfWork<'a> {
	store: &'a MemoryCounterStore,
	locked: HashMap<String, (Arc<Row>, OwnedMutexGuard<()>)>,
	staged: HashMap<String, u64>,
}

impl<'a> MemoryUnitOfWork<'a> {
	pub(crate) fn new(store: &'a MemoryCounterStore) -> Self {
		Self {
			store,
			locked: HashMap::new(),
			staged: HashMap::new(),
		}
	}

	async fn lock_row(&mut self, key: &str) -> Result<Arc<Row>, StoreError> {
		if let Some((row, _)) = self.locked.get(key) {
			return Ok(Arc::clone(row));
		}

		let row = self.store.row(key)?;
		let guard = Arc::clone(&row.lock).lock_owned().await;
		self.locked
			.insert(key.to_string(), (Arc::clone(&row), guard));
		Ok(row)
	}

	fn view(&self, row: &Row) -> Counter {
		let mut counter = Counter::clone(&row.record.load());
		if let Some(quantity) = self.staged.get(&counter.key) {
			counter.quantity = *quantity;
		}
		counter
	}
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork<'_> {
	async fn read(&mut self, key: &str) -> Result<Counter, StoreError> {
		let row = self.store.row(key)?;
		Ok(self.view(&row))
	}

	async fn read_for_exclusive_access(&mut self, key: &str) -> Result<Counter, StoreError> {
		let row = self.lock_row(key).await?;
		Ok(self.view(&row))
	}

	async fn write(&mut self, key: &str, new_quantity: u64) -> Result<(), StoreError> {
		self.lock_row(key).await?;
		self.staged.insert(key.to_string(), new_quantity);
		Ok(())
	}

	async fn commit(self: Box<Self>) -> Result<(), StoreError> {
		let mut this = *self;

		for (key, quantity) in this.staged.drain() {
			// Writes always take the row lock, so every staged key is locked.
			if let Some((row, _)) = this.locked.get(&key) {
				this.store.publish(row, quantity);
				tracing::debug!(key = %key, quantity, "unit of work committed write");
			}
		}

		// Row locks are released here, after every write is visible.
		drop(this.locked);
		Ok(())
	}
}
