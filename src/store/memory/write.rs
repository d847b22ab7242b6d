/* src/store/memory/write.rs */

use std::cell::RefCell;
use std::sync::Arc;

#[cfg(feature = "events")]
use super::super::CounterEvent;
use super::super::StoreError;
use super::{MemoryCounterStore, Row};
use crate::counter::Counter;

impl MemoryCounterStore {
	/// Creates a counter at version zero.
	///
	/// Fails with [`StoreError::AlreadyExists`] if the key is taken.
	pub fn insert(&self, key: impl Into<String>, quantity: u64) -> Result<Arc<Counter>, StoreError> {
		let key = key.into();
		let counter = Arc::new(Counter::new(key.clone(), quantity));
		let row = Arc::new(Row::new(Arc::clone(&counter)));

		// Capture the outcome inside rcu, the closure may run more than once.
		let existed = RefCell::new(false);

		self.rows.rcu(|map| {
			*existed.borrow_mut() = map.contains_key(&key);
			let mut new_map = (**map).clone();
			new_map.entry(key.clone()).or_insert_with(|| Arc::clone(&row));
			new_map
		});

		if existed.into_inner() {
			return Err(StoreError::AlreadyExists { key });
		}

		#[cfg(feature = "events")]
		{
			let _ = self.events.send(CounterEvent::Inserted {
				counter: Arc::clone(&counter),
			});
		}

		tracing::debug!(key = %key, quantity, "counter inserted");
		Ok(counter)
	}

	/// Removes a counter by key.
	pub fn remove(&self, key: &str) -> Result<Arc<Counter>, StoreError> {
		let removed: RefCell<Option<Arc<Row>>> = RefCell::new(None);

		self.rows.rcu(|map| {
			let mut new_map = (**map).clone();
			*removed.borrow_mut() = new_map.remove(key);
			new_map
		});

		let row = removed.into_inner().ok_or_else(|| StoreError::NotFound {
			key: key.to_string(),
		})?;
		let counter = row.record.load_full();

		#[cfg(feature = "events")]
		{
			let _ = self.events.send(CounterEvent::Removed {
				counter: Arc::clone(&counter),
			});
		}

		Ok(counter)
	}

	/// Stores `quantity` as the row's next version.
	///
	/// The caller must hold the row lock.
	pub(crate) fn publish(&self, row: &Row, quantity: u64) -> Arc<Counter> {
		let old = row.record.load_full();
		let new = Arc::new(Counter {
			key: old.key.clone(),
			quantity,
			version: old.version + 1,
		});
		row.record.store(Arc::clone(&new));

		tracing::trace!(key = %new.key, quantity, version = new.version, "counter written");

		#[cfg(feature = "events")]
		{
			let _ = self.events.send(CounterEvent::Updated {
				old,
				new: Arc::clone(&new),
			});
		}

		#[cfg(not(feature = "events"))]
		{
			let _ = old;
		}

		new
	}
}
