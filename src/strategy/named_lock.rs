/* src/strategy/named_lock.rs */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::guard::ReleaseGuard;
use super::owner::OwnerIds;
use super::{
	DecreaseError, LockError, LockStrategy, ReadMode, StrategyKind, decrease_in_unit_of_work,
};
use crate::coord::NamedLocks;
use crate::counter::Counter;
use crate::store::CounterStore;

/// Default bound on the wait for a named lock.
pub const DEFAULT_NAMED_LOCK_TIMEOUT: Duration = Duration::from_millis(3000);

/// Guards each key with a store-side named lock, separate from the row.
///
/// The lock is taken before the unit of work begins and released only after
/// it commits, so no other holder can read the row between this write and
/// its commit.
pub struct NamedLockStrategy {
	store: Arc<dyn CounterStore>,
	locks: Arc<dyn NamedLocks>,
	sessions: OwnerIds,
	timeout: Duration,
}

impl NamedLockStrategy {
	pub fn new(store: Arc<dyn CounterStore>, locks: Arc<dyn NamedLocks>) -> Self {
		Self {
			store,
			locks,
			sessions: OwnerIds::new("named"),
			timeout: DEFAULT_NAMED_LOCK_TIMEOUT,
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}
}

#[async_trait]
impl LockStrategy for NamedLockStrategy {
	fn kind(&self) -> StrategyKind {
		StrategyKind::NamedLock
	}

	async fn decrease(&self, key: &str, amount: u64) -> Result<Counter, DecreaseError> {
		let session = self.sessions.next();

		if !self.locks.get_lock(key, &session, self.timeout).await? {
			tracing::debug!(key = %key, session = %session, "named lock wait elapsed");
			return Err(LockError::Timeout {
				key: key.to_string(),
				waited: self.timeout,
			}
			.into());
		}
		tracing::debug!(key = %key, session = %session, "named lock acquired");

		let guard = ReleaseGuard::new(release(Arc::clone(&self.locks), key.to_string(), session));
		let result = decrease_in_unit_of_work(self.store.as_ref(), key, amount, ReadMode::Plain).await;
		guard.release().await;

		result
	}
}

async fn release(locks: Arc<dyn NamedLocks>, name: String, session: String) {
	match locks.release_lock(&name, &session).await {
		Ok(true) => tracing::debug!(key = %name, session = %session, "named lock released"),
		Ok(false) => tracing::debug!(key = %name, session = %session, "named lock already reclaimed"),
		Err(e) => tracing::warn!(key = %name, session = %session, error = %e, "failed to release named lock"),
	}
}
