/* src/strategy/pubsub_lock.rs */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::guard::ReleaseGuard;
use super::owner::OwnerIds;
use super::{DecreaseError, LockError, LockStrategy, StrategyKind, decrease_exclusive};
use crate::coord::LockService;
use crate::counter::Counter;
use crate::store::CounterStore;

/// Default bound on the wait for the lock.
pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(10);

/// Default lease after which an unreleased lock expires.
pub const DEFAULT_LEASE_TIME: Duration = Duration::from_secs(1);

/// Waits on a cache-native lock and is woken by release notifications.
///
/// Puts less load on the cache than [`SpinLockStrategy`](super::SpinLockStrategy)
/// under contention. A holder that never unlocks is cut off by the lease.
pub struct PubSubLockStrategy {
	store: Arc<dyn CounterStore>,
	locks: Arc<dyn LockService>,
	owners: OwnerIds,
	wait_time: Duration,
	lease_time: Duration,
}

impl PubSubLockStrategy {
	pub fn new(store: Arc<dyn CounterStore>, locks: Arc<dyn LockService>) -> Self {
		Self {
			store,
			locks,
			owners: OwnerIds::new("pubsub"),
			wait_time: DEFAULT_WAIT_TIME,
			lease_time: DEFAULT_LEASE_TIME,
		}
	}

	pub fn with_wait_time(mut self, wait_time: Duration) -> Self {
		self.wait_time = wait_time;
		self
	}

	pub fn with_lease_time(mut self, lease_time: Duration) -> Self {
		self.lease_time = lease_time;
		self
	}
}

#[async_trait]
impl LockStrategy for PubSubLockStrategy {
	fn kind(&self) -> StrategyKind {
		StrategyKind::PubSubLock
	}

	async fn decrease(&self, key: &str, amount: u64) -> Result<Counter, DecreaseError> {
		let owner = self.owners.next();

		let acquired = self
			.locks
			.acquire_lock(key, &owner, self.wait_time, self.lease_time)
			.await?;
		if !acquired {
			tracing::debug!(key = %key, owner = %owner, "lock wait elapsed");
			return Err(LockError::Timeout {
				key: key.to_string(),
				waited: self.wait_time,
			}
			.into());
		}
		tracing::debug!(key = %key, owner = %owner, "lock acquired");

		let guard = ReleaseGuard::new(release(Arc::clone(&self.locks), key.to_string(), owner));
		let result = decrease_exclusive(self.store.as_ref(), key, amount).await;
		guard.release().await;

		result
	}
}

async fn release(locks: Arc<dyn LockService>, key: String, owner: String) {
	match locks.release_lock(&key, &owner).await {
		Ok(true) => tracing::debug!(key = %key, owner = %owner, "lock released"),
		Ok(false) => tracing::debug!(key = %key, owner = %owner, "lock lease already expired"),
		Err(e) => tracing::warn!(key = %key, owner = %owner, error = %e, "failed to release lock"),
	}
}
