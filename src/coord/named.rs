/* src/coord/named.rs */

use std::time::Duration;

use async_trait::async_trait;

use super::NamedLocks;
use super::lease::LeaseTable;
use crate::store::StoreError;

/// In-memory advisory named locks.
///
/// Locks are held by session until released or until the session ends. An
/// optional lease bounds how long a lock survives a session that never
/// comes back, standing in for the store reaping dead connections.
pub struct MemoryNamedLocks {
	table: LeaseTable,
	lease: Option<Duration>,
}

impl MemoryNamedLocks {
	/// Creates named locks that are held until released.
	pub fn new() -> Self {
		Self {
			table: LeaseTable::new(),
			lease: None,
		}
	}

	/// Creates named locks that are reclaimed `lease` after acquisition.
	pub fn with_lease(lease: Duration) -> Self {
		Self {
			table: LeaseTable::new(),
			lease: Some(lease),
		}
	}

	/// Releases every lock `session` holds, as the store does when a
	/// connection closes. Returns how many locks were released.
	pub async fn end_session(&self, session: &str) -> usize {
		let released = self.table.release_all(session).await;
		tracing::debug!(session = %session, released, "named lock session ended");
		released
	}

	/// Returns the session currently holding `name`.
	pub async fn holder(&self, name: &str) -> Option<String> {
		self.table.holder(name).await
	}
}

impl Default for MemoryNamedLocks {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl NamedLocks for MemoryNamedLocks {
	async fn get_lock(&self, name: &str, session: &str, timeout: Duration) -> Result<bool, StoreError> {
		Ok(self
			.table
			.acquire(name, session, Some(timeout), self.lease)
			.await)
	}

	async fn release_lock(&self, name: &str, session: &str) -> Result<bool, StoreError> {
		Ok(self.table.release(name, session).await)
	}
}
