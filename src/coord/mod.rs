/* src/coord/mod.rs */

//!
//! Coordination services consumed by the lock strategies.
//!
//! - [`NamedLocks`] - store-side advisory mutex addressed by name.
//! - [`CoordinationCache`] - conditional set / delete on a shared cache.
//! - [`LockService`] - cache-native lock with wait time, lease time and
//!   release notifications.

#[cfg(feature = "memory")]
mod cache;
#[cfg(feature = "memory")]
mod lease;
#[cfg(feature = "memory")]
mod named;

#[cfg(feature = "memory")]
pub use cache::MemoryCache;
#[cfg(feature = "memory")]
pub use named::MemoryNamedLocks;

use std::time::Duration;

use async_trait::async_trait;

use crate::store::StoreError;

/// Advisory named locks provided by the store, independent of any row.
#[async_trait]
pub trait NamedLocks: Send + Sync {
	/// Acquires `name` for `session`, waiting at most `timeout`.
	///
	/// Returns `false` when the wait elapsed.
	async fn get_lock(&self, name: &str, session: &str, timeout: Duration) -> Result<bool, StoreError>;

	/// Releases `name` if `session` holds it.
	///
	/// Returns `false` when `session` no longer holds it, for example because
	/// the store already reclaimed it.
	async fn release_lock(&self, name: &str, session: &str) -> Result<bool, StoreError>;
}

/// Key-value operations of a shared cache.
#[async_trait]
pub trait CoordinationCache: Send + Sync {
	/// Sets `key` to `value` with a time-to-live, only if `key` is absent.
	async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError>;

	/// Deletes `key`. Returns whether a live entry was removed.
	async fn delete(&self, key: &str) -> Result<bool, StoreError>;

	/// Deletes `key` only while it still holds `value`.
	async fn delete_if_equals(&self, key: &str, value: &str) -> Result<bool, StoreError>;
}

/// Cache-native locks whose waiters are woken by release notifications.
#[async_trait]
pub trait LockService: Send + Sync {
	/// Acquires `key` for `owner`, waiting at most `wait_time`.
	///
	/// The lock expires on its own after `lease_time`.
	async fn acquire_lock(
		&self,
		key: &str,
		owner: &str,
		wait_time: Duration,
		lease_time: Duration,
	) -> Result<bool, StoreError>;

	/// Releases `key` if `owner` holds it. Returns `false` when the lease had
	/// already expired.
	async fn release_lock(&self, key: &str, owner: &str) -> Result<bool, StoreError>;
}
