/* src/strategy/optimistic.rs */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{DecreaseError, LockError, LockStrategy, StrategyKind};
use crate::counter::{self, Counter};
use crate::store::CounterStore;

/// Default pause between a version conflict and the next attempt.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Detects lost updates at write time through the counter's version.
///
/// Never blocks before writing. On a version conflict it sleeps for the
/// back-off, then re-reads, recomputes and re-writes. Only conflicts are
/// retried; insufficient stock and store failures end the attempt.
pub struct OptimisticStrategy {
	store: Arc<dyn CounterStore>,
	backoff: Duration,
	max_attempts: Option<u32>,
}

impl OptimisticStrategy {
	/// Retries without limit, [`DEFAULT_RETRY_BACKOFF`] apart.
	pub fn new(store: Arc<dyn CounterStore>) -> Self {
		Self {
			store,
			backoff: DEFAULT_RETRY_BACKOFF,
			max_attempts: None,
		}
	}

	pub fn with_backoff(mut self, backoff: Duration) -> Self {
		self.backoff = backoff;
		self
	}

	/// Caps the number of write attempts. `None` retries until success.
	pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
		self.max_attempts = max_attempts;
		self
	}
}

#[async_trait]
impl LockStrategy for OptimisticStrategy {
	fn kind(&self) -> StrategyKind {
		StrategyKind::Optimistic
	}

	async fn decrease(&self, key: &str, amount: u64) -> Result<Counter, DecreaseError> {
		let mut attempts = 0u32;

		loop {
			attempts += 1;

			let current = self.store.read(key).await?;
			let next = counter::apply(&current, amount)?;

			match self
				.store
				.write_if_version_matches(key, next.quantity, current.version)
				.await
			{
				Ok(written) => return Ok(written),
				Err(e) if e.is_contention() => {
					if self.max_attempts.is_some_and(|max| attempts >= max) {
						tracing::warn!(key = %key, attempts, "optimistic decrease gave up");
						return Err(LockError::RetriesExhausted {
							key: key.to_string(),
							attempts,
						}
						.into());
					}
					tracing::trace!(key = %key, attempts, error = %e, "version conflict, backing off");
					tokio::time::sleep(self.backoff).await;
				}
				Err(e) => return Err(e.into()),
			}
		}
	}
}
