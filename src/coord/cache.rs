/* src/coord/cache.rs */

use std::time::Duration;

use async_trait::async_trait;

use super::lease::LeaseTable;
use super::{CoordinationCache, LockService};
use crate::store::StoreError;

/// In-memory stand-in for a shared cache cluster.
///
/// Plain entries and locks share one key space. Releases are published to
/// blocked [`LockService::acquire_lock`] callers instead of being polled for.
pub struct MemoryCache {
	table: LeaseTable,
}

impl MemoryCache {
	pub fn new() -> Self {
		Self {
			table: LeaseTable::new(),
		}
	}

	/// Returns the value stored under `key`, if it has not expired.
	pub async fn get(&self, key: &str) -> Option<String> {
		self.table.holder(key).await
	}
}

impl Default for MemoryCache {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl CoordinationCache for MemoryCache {
	async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
		Ok(self.table.try_acquire(key, value, Some(ttl)).await)
	}

	async fn delete(&self, key: &str) -> Result<bool, StoreError> {
		Ok(self.table.remove(key).await)
	}

	async fn delete_if_equals(&self, key: &str, value: &str) -> Result<bool, StoreError> {
		Ok(self.table.release(key, value).await)
	}
}

#[async_trait]
impl LockService for MemoryCache {
	async fn acquire_lock(
		&self,
		key: &str,
		owner: &str,
		wait_time: Duration,
		lease_time: Duration,
	) -> Result<bool, StoreError> {
		Ok(self
			.table
			.acquire(key, owner, Some(wait_time), Some(lease_time))
			.await)
	}

	async fn release_lock(&self, key: &str, owner: &str) -> Result<bool, StoreError> {
		Ok(self.table.release(key, owner).await)
	}
}
