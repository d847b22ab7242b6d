/* src/strategy/spin_lock.rs */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::guard::ReleaseGuard;
use super::owner::OwnerIds;
use super::{DecreaseError, LockError, LockStrategy, StrategyKind, decrease_exclusive};
use crate::coord::CoordinationCache;
use crate::counter::Counter;
use crate::store::CounterStore;

/// Default pause between failed acquisition attempts.
pub const DEFAULT_SPIN_INTERVAL: Duration = Duration::from_millis(100);

/// Default lifetime of the cache entry acting as the lock.
pub const DEFAULT_SPIN_LEASE: Duration = Duration::from_millis(3000);

/// Polls a cache with set-if-absent until the lock entry is free.
///
/// Simple, at the cost of steady load on the cache while contended. Waits
/// without bound unless a timeout is configured.
pub struct SpinLockStrategy {
	store: Arc<dyn CounterStore>,
	cache: Arc<dyn CoordinationCache>,
	owners: OwnerIds,
	interval: Duration,
	lease: Duration,
	timeout: Option<Duration>,
}

impl SpinLockStrategy {
	pub fn new(store: Arc<dyn CounterStore>, cache: Arc<dyn CoordinationCache>) -> Self {
		Self {
			store,
			cache,
			owners: OwnerIds::new("spin"),
			interval: DEFAULT_SPIN_INTERVAL,
			lease: DEFAULT_SPIN_LEASE,
			timeout: None,
		}
	}

	pub fn with_interval(mut self, interval: Duration) -> Self {
		self.interval = interval;
		self
	}

	pub fn with_lease(mut self, lease: Duration) -> Self {
		self.lease = lease;
		self
	}

	pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.timeout = timeout;
		self
	}

	async fn lock(&self, key: &str, owner: &str) -> Result<(), DecreaseError> {
		let deadline = self.timeout.map(|t| Instant::now() + t);
		let mut attempts = 0u64;

		// Cache errors are not contention, so they end the attempt.
		while !self.cache.set_if_absent(key, owner, self.lease).await? {
			attempts += 1;
			if let (Some(deadline), Some(timeout)) = (deadline, self.timeout)
				&& Instant::now() >= deadline
			{
				return Err(LockError::Timeout {
					key: key.to_string(),
					waited: timeout,
				}
				.into());
			}
			tracing::trace!(key = %key, owner = %owner, attempts, "spin lock busy");
			tokio::time::sleep(self.interval).await;
		}

		tracing::debug!(key = %key, owner = %owner, attempts, "spin lock acquired");
		Ok(())
	}
}

#[async_trait]
impl LockStrategy for SpinLockStrategy {
	fn kind(&self) -> StrategyKind {
		StrategyKind::SpinLock
	}

	async fn decrease(&self, key: &str, amount: u64) -> Result<Counter, DecreaseError> {
		let owner = self.owners.next();
		self.lock(key, &owner).await?;

		let guard = ReleaseGuard::new(release(Arc::clone(&self.cache), key.to_string(), owner));
		let result = decrease_exclusive(self.store.as_ref(), key, amount).await;
		guard.release().await;

		result
	}
}

async fn release(cache: Arc<dyn CoordinationCache>, key: String, owner: String) {
	// Compare before deleting so an expired lease never frees a newer holder's lock.
	match cache.delete_if_equals(&key, &owner).await {
		Ok(true) => tracing::debug!(key = %key, owner = %owner, "spin lock released"),
		Ok(false) => tracing::debug!(key = %key, owner = %owner, "spin lock lease already expired"),
		Err(e) => tracing::warn!(key = %key, owner = %owner, error = %e, "failed to release spin lock"),
	}
}
