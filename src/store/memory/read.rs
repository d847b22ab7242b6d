/* src/store/memory/read.rs */

use std::sync::Arc;

#[cfg(feature = "events")]
use super::super::CounterEvent;
use super::MemoryCounterStore;
use crate::counter::Counter;

impl MemoryCounterStore {
	/// Gets the committed counter by key. This is a wait-free operation.
	pub fn get(&self, key: &str) -> Option<Arc<Counter>> {
		let snapshot = self.rows.load();
		snapshot.get(key).map(|row| row.record.load_full())
	}

	/// Returns all keys in the store.
	pub fn keys(&self) -> Vec<String> {
		let snapshot = self.rows.load();
		snapshot.keys().cloned().collect()
	}

	/// Returns the number of counters.
	pub fn len(&self) -> usize {
		self.rows.load().len()
	}

	/// Returns true if the store holds no counters.
	pub fn is_empty(&self) -> bool {
		self.rows.load().is_empty()
	}

	/// Subscribes to committed changes.
	#[cfg(feature = "events")]
	pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<CounterEvent> {
		self.events.subscribe()
	}
}
