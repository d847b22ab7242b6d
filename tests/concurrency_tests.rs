/* tests/concurrency_tests.rs */

#![cfg(feature = "memory")]

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{KEY, ProbeStore, decrease_concurrently, facade, quantity, seeded_store};
use stockguard::coord::{MemoryCache, MemoryNamedLocks};
use stockguard::strategy::{
	InProcessMutexStrategy, NamedLockStrategy, OptimisticStrategy, PessimisticStrategy,
	PubSubLockStrategy, SpinLockStrategy,
};
use stockguard::{
	Counter, CounterStore, DecreaseError, LockStrategy, StockFacade, StrategyKind, counter,
};
use tokio::sync::Mutex;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_hundred_concurrent_decrements_reach_zero() {
	for kind in StrategyKind::ALL {
		let store = seeded_store(100);
		let facade = facade(kind, store.clone());

		let succeeded = decrease_concurrently(&facade, 100).await;

		assert_eq!(succeeded, 100, "{kind}");
		assert_eq!(quantity(&store), 0, "{kind}");
		assert_eq!(store.get(KEY).unwrap().version, 100, "{kind}");
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_oversubscribed_decrements_never_go_negative() {
	for kind in StrategyKind::ALL {
		let store = seeded_store(100);
		let facade = facade(kind, store.clone());

		let succeeded = decrease_concurrently(&facade, 150).await;

		assert_eq!(succeeded, 100, "{kind}");
		assert_eq!(quantity(&store), 0, "{kind}");
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_in_process_mutex_does_not_exclude_other_instances() {
	let inner = seeded_store(100);
	let store: Arc<dyn CounterStore> =
		Arc::new(ProbeStore::new(inner.clone()).with_read_delay(Duration::from_millis(1)));

	// Two processes, each with its own mutex, sharing one store.
	let first = StockFacade::new(Arc::new(InProcessMutexStrategy::new(store.clone())));
	let second = StockFacade::new(Arc::new(InProcessMutexStrategy::new(store)));

	let (a, b) = tokio::join!(
		decrease_concurrently(&first, 50),
		decrease_concurrently(&second, 50)
	);

	// Every request was told it succeeded, yet updates were lost.
	assert_eq!(a + b, 100);
	assert!(quantity(&inner) > 0);
}

/// One instance of `kind`, sharing `store` and the coordination services.
fn instance(
	kind: StrategyKind,
	store: &Arc<dyn CounterStore>,
	named_locks: &Arc<MemoryNamedLocks>,
	cache: &Arc<MemoryCache>,
) -> StockFacade {
	let store = store.clone();
	let strategy: Arc<dyn LockStrategy> = match kind {
		StrategyKind::InProcessMutex => Arc::new(InProcessMutexStrategy::new(store)),
		StrategyKind::Optimistic => {
			Arc::new(OptimisticStrategy::new(store).with_backoff(Duration::from_millis(1)))
		}
		StrategyKind::Pessimistic => Arc::new(PessimisticStrategy::new(store)),
		StrategyKind::NamedLock => Arc::new(
			NamedLockStrategy::new(store, named_locks.clone()).with_timeout(Duration::from_secs(10)),
		),
		StrategyKind::SpinLock => Arc::new(
			SpinLockStrategy::new(store, cache.clone()).with_interval(Duration::from_millis(2)),
		),
		StrategyKind::PubSubLock => Arc::new(PubSubLockStrategy::new(store, cache.clone())),
	};
	StockFacade::new(strategy)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_store_and_cache_strategies_exclude_other_instances() {
	let kinds = StrategyKind::ALL
		.into_iter()
		.filter(|kind| *kind != StrategyKind::InProcessMutex);

	for kind in kinds {
		let inner = seeded_store(100);
		let store: Arc<dyn CounterStore> =
			Arc::new(ProbeStore::new(inner.clone()).with_read_delay(Duration::from_millis(1)));
		let named_locks = Arc::new(MemoryNamedLocks::new());
		let cache = Arc::new(MemoryCache::new());

		// Two processes, each with its own strategy instance.
		let first = instance(kind, &store, &named_locks, &cache);
		let second = instance(kind, &store, &named_locks, &cache);

		let (a, b) = tokio::join!(
			decrease_concurrently(&first, 50),
			decrease_concurrently(&second, 50)
		);

		assert_eq!(a + b, 100, "{kind}");
		assert_eq!(quantity(&inner), 0, "{kind}");
	}
}

/// Excludes with an in-process mutex around a unit of work, choosing whether
/// the mutex is released before or after the commit.
struct UnitUnderMutex {
	store: Arc<dyn CounterStore>,
	lock: Mutex<()>,
	release_before_commit: bool,
}

impl UnitUnderMutex {
	fn new(store: Arc<dyn CounterStore>, release_before_commit: bool) -> Self {
		Self {
			store,
			lock: Mutex::new(()),
			release_before_commit,
		}
	}
}

#[async_trait]
impl LockStrategy for UnitUnderMutex {
	fn kind(&self) -> StrategyKind {
		StrategyKind::InProcessMutex
	}

	async fn decrease(&self, key: &str, amount: u64) -> Result<Counter, DecreaseError> {
		let guard = self.lock.lock().await;

		let mut unit = self.store.begin().await?;
		let current = unit.read(key).await?;
		let next = counter::apply(&current, amount)?;
		unit.write(key, next.quantity).await?;

		if self.release_before_commit {
			drop(guard);
			tokio::time::sleep(Duration::from_millis(1)).await;
			unit.commit().await?;
		} else {
			unit.commit().await?;
			drop(guard);
		}
		Ok(next)
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_releasing_exclusion_before_commit_loses_updates() {
	let store = seeded_store(100);
	let facade = StockFacade::new(Arc::new(UnitUnderMutex::new(store.clone(), true)));

	let succeeded = decrease_concurrently(&facade, 100).await;

	assert_eq!(succeeded, 100);
	assert!(quantity(&store) > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_commit_before_releasing_exclusion_is_exact() {
	let store = seeded_store(100);
	let facade = StockFacade::new(Arc::new(UnitUnderMutex::new(store.clone(), false)));

	let succeeded = decrease_concurrently(&facade, 100).await;

	assert_eq!(succeeded, 100);
	assert_eq!(quantity(&store), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_strategies_isolate_keys() {
	for kind in StrategyKind::ALL {
		let store = seeded_store(50);
		store.insert("2", 50).unwrap();
		let facade = facade(kind, store.clone());

		let mut handles = Vec::new();
		for i in 0..100 {
			let facade = facade.clone();
			let key = if i % 2 == 0 { KEY } else { "2" };
			handles.push(tokio::spawn(async move { facade.decrease(key, 1).await }));
		}
		for handle in handles {
			handle.await.unwrap().unwrap();
		}

		assert_eq!(quantity(&store), 0, "{kind}");
		assert_eq!(store.get("2").unwrap().quantity, 0, "{kind}");
	}
}
