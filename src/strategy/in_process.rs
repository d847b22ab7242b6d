/* src/strategy/in_process.rs */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{DecreaseError, LockError, LockStrategy, StrategyKind, decrease_exclusive};
use crate::counter::Counter;
use crate::store::CounterStore;

/// Serializes every decrease behind one mutex owned by this instance.
///
/// The mutex only excludes callers that share the instance. Two instances,
/// like two server processes, race each other on the same store row.
pub struct InProcessMutexStrategy {
	store: Arc<dyn CounterStore>,
	lock: Mutex<()>,
	timeout: Option<Duration>,
}

impl InProcessMutexStrategy {
	/// Creates a strategy with its own mutex and no acquisition timeout.
	pub fn new(store: Arc<dyn CounterStore>) -> Self {
		Self {
			store,
			lock: Mutex::new(()),
			timeout: None,
		}
	}

	/// Gives up with [`LockError::Timeout`] after waiting `timeout` for the mutex.
	pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.timeout = timeout;
		self
	}
}

#[async_trait]
impl LockStrategy for InProcessMutexStrategy {
	fn kind(&self) -> StrategyKind {
		StrategyKind::InProcessMutex
	}

	async fn decrease(&self, key: &str, amount: u64) -> Result<Counter, DecreaseError> {
		let _guard = match self.timeout {
			None => self.lock.lock().await,
			Some(timeout) => tokio::time::timeout(timeout, self.lock.lock())
				.await
				.map_err(|_| LockError::Timeout {
					key: key.to_string(),
					waited: timeout,
				})?,
		};

		decrease_exclusive(self.store.as_ref(), key, amount).await
	}
}
