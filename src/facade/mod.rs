/* src/facade/mod.rs */

//!
//! Single entry point for decrementing stock.

mod error;

pub use error::FacadeError;

use std::sync::Arc;

use crate::config::LockConfig;
use crate::coord::{CoordinationCache, LockService, NamedLocks};
use crate::counter::Counter;
use crate::store::CounterStore;
use crate::strategy::{
	DecreaseError, InProcessMutexStrategy, LockStrategy, NamedLockStrategy, OptimisticStrategy,
	PessimisticStrategy, PubSubLockStrategy, SpinLockStrategy, StrategyKind,
};

/// Decrements stock through one configured [`LockStrategy`].
#[derive(Clone)]
pub struct StockFacade {
	strategy: Arc<dyn LockStrategy>,
}

/// Builder for [`StockFacade`].
///
/// The store is always required. The coordination services are required
/// only by the strategies that use them.
pub struct StockFacadeBuilder {
	store: Option<Arc<dyn CounterStore>>,
	named_locks: Option<Arc<dyn NamedLocks>>,
	cache: Option<Arc<dyn CoordinationCache>>,
	lock_service: Option<Arc<dyn LockService>>,
	config: LockConfig,
}

impl StockFacadeBuilder {
	pub fn new() -> Self {
		Self {
			store: None,
			named_locks: None,
			cache: None,
			lock_service: None,
			config: LockConfig::default(),
		}
	}

	pub fn store(mut self, store: Arc<dyn CounterStore>) -> Self {
		self.store = Some(store);
		self
	}

	pub fn named_locks(mut self, locks: Arc<dyn NamedLocks>) -> Self {
		self.named_locks = Some(locks);
		self
	}

	pub fn cache(mut self, cache: Arc<dyn CoordinationCache>) -> Self {
		self.cache = Some(cache);
		self
	}

	pub fn lock_service(mut self, locks: Arc<dyn LockService>) -> Self {
		self.lock_service = Some(locks);
		self
	}

	pub fn config(mut self, config: LockConfig) -> Self {
		self.config = config;
		self
	}

	/// Shorthand for a config with default tuning for `kind`.
	pub fn strategy(mut self, kind: StrategyKind) -> Self {
		self.config.strategy = kind;
		self
	}

	pub fn build(self) -> Result<StockFacade, FacadeError> {
		let config = self.config;
		let store = self
			.store
			.ok_or_else(|| FacadeError::Builder("store is required".to_string()))?;

		let strategy: Arc<dyn LockStrategy> = match config.strategy {
			StrategyKind::InProcessMutex => {
				Arc::new(InProcessMutexStrategy::new(store).with_timeout(config.mutex_timeout()))
			}
			StrategyKind::Optimistic => Arc::new(
				OptimisticStrategy::new(store)
					.with_backoff(config.retry_backoff())
					.with_max_attempts(config.max_attempts),
			),
			StrategyKind::Pessimistic => Arc::new(PessimisticStrategy::new(store)),
			StrategyKind::NamedLock => {
				let locks = self.named_locks.ok_or_else(|| {
					FacadeError::Builder("named locks are required for named_lock".to_string())
				})?;
				Arc::new(NamedLockStrategy::new(store, locks).with_timeout(config.named_lock_timeout()))
			}
			StrategyKind::SpinLock => {
				let cache = self.cache.ok_or_else(|| {
					FacadeError::Builder("cache is required for spin_lock".to_string())
				})?;
				Arc::new(
					SpinLockStrategy::new(store, cache)
						.with_interval(config.spin_interval())
						.with_lease(config.spin_lease())
						.with_timeout(config.spin_timeout()),
				)
			}
			StrategyKind::PubSubLock => {
				let locks = self.lock_service.ok_or_else(|| {
					FacadeError::Builder("lock service is required for pub_sub_lock".to_string())
				})?;
				Arc::new(
					PubSubLockStrategy::new(store, locks)
						.with_wait_time(config.pubsub_wait())
						.with_lease_time(config.pubsub_lease()),
				)
			}
		};

		tracing::debug!(strategy = %config.strategy, "stock facade built");
		Ok(StockFacade { strategy })
	}
}

impl Default for StockFacadeBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl StockFacade {
	pub fn builder() -> StockFacadeBuilder {
		StockFacadeBuilder::new()
	}

	/// Wraps an already constructed strategy.
	pub fn new(strategy: Arc<dyn LockStrategy>) -> Self {
		Self { strategy }
	}

	/// The strategy in use.
	pub fn kind(&self) -> StrategyKind {
		self.strategy.kind()
	}

	/// Takes `amount` units from the counter at `key`.
	pub async fn decrease(&self, key: &str, amount: u64) -> Result<Counter, DecreaseError> {
		let result = self.strategy.decrease(key, amount).await;

		match &result {
			Ok(counter) => tracing::debug!(
				strategy = %self.kind(),
				key = %key,
				amount,
				quantity = counter.quantity,
				"stock decreased"
			),
			Err(e) if e.is_insufficient_stock() => {
				tracing::debug!(strategy = %self.kind(), key = %key, amount, "insufficient stock")
			}
			Err(e) => tracing::warn!(strategy = %self.kind(), key = %key, amount, error = %e, "decrease failed"),
		}

		result
	}
}

impl std::fmt::Debug for StockFacade {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StockFacade")
			.field("strategy", &self.kind())
			.finish_non_exhaustive()
	}
}
