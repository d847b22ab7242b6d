/* tests/common/mod.rs */

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use stockguard::coord::{
	CoordinationCache, LockService, MemoryCache, MemoryNamedLocks, NamedLocks,
};
use stockguard::store::{CounterStore, MemoryCounterStore, StoreError, UnitOfWork};
use stockguard::{Counter, LockConfig, StockFacade, StrategyKind};

pub const KEY: &str = "1";

/// A store holding `quantity` units under [`KEY`].
pub fn seeded_store(quantity: u64) -> Arc<MemoryCounterStore> {
	let store = Arc::new(MemoryCounterStore::new());
	store.insert(KEY, quantity).unwrap();
	store
}

pub fn quantity(store: &MemoryCounterStore) -> u64 {
	store.get(KEY).unwrap().quantity
}

/// Config with short waits so contended tests finish quickly.
pub fn fast_config(kind: StrategyKind) -> LockConfig {
	LockConfig {
		retry_backoff_ms: 1,
		spin_interval_ms: 2,
		..LockConfig::for_strategy(kind)
	}
}

/// A facade over `store` wired with in-memory coordination services.
pub fn facade(kind: StrategyKind, store: Arc<MemoryCounterStore>) -> StockFacade {
	let cache = Arc::new(MemoryCache::new());
	StockFacade::builder()
		.store(store)
		.named_locks(Arc::new(MemoryNamedLocks::new()))
		.cache(cache.clone())
		.lock_service(cache)
		.config(fast_config(kind))
		.build()
		.unwrap()
}

/// Runs `requests` concurrent decrements of one unit. Returns how many succeeded.
pub async fn decrease_concurrently(facade: &StockFacade, requests: usize) -> usize {
	let mut handles = Vec::with_capacity(requests);
	for _ in 0..requests {
		let facade = facade.clone();
		handles.push(tokio::spawn(async move { facade.decrease(KEY, 1).await }));
	}

	let mut succeeded = 0;
	for handle in handles {
		match handle.await.unwrap() {
			Ok(_) => succeeded += 1,
			Err(e) => assert!(e.is_insufficient_stock(), "unexpected error: {e}"),
		}
	}
	succeeded
}

/// Delegates to a memory store, counting calls and optionally injecting faults.
pub struct ProbeStore {
	pub inner: Arc<MemoryCounterStore>,
	pub reads: AtomicUsize,
	pub versioned_writes: AtomicUsize,
	/// Sleep inside every read, widening the read-to-write window.
	pub read_delay: Option<Duration>,
	/// Number of versioned writes that are made to conflict first.
	pub forced_conflicts: AtomicUsize,
	/// Every read fails as if the store were down.
	pub unavailable: bool,
}

impl ProbeStore {
	pub fn new(inner: Arc<MemoryCounterStore>) -> Self {
		Self {
			inner,
			reads: AtomicUsize::new(0),
			versioned_writes: AtomicUsize::new(0),
			read_delay: None,
			forced_conflicts: AtomicUsize::new(0),
			unavailable: false,
		}
	}

	pub fn with_read_delay(mut self, delay: Duration) -> Self {
		self.read_delay = Some(delay);
		self
	}

	pub fn with_forced_conflicts(self, conflicts: usize) -> Self {
		self.forced_conflicts.store(conflicts, Ordering::SeqCst);
		self
	}

	pub fn unavailable(mut self) -> Self {
		self.unavailable = true;
		self
	}

	fn outage() -> StoreError {
		StoreError::Unavailable {
			reason: "connection refused".to_string(),
		}
	}
}

#[async_trait]
impl CounterStore for ProbeStore {
	async fn read(&self, key: &str) -> Result<Counter, StoreError> {
		self.reads.fetch_add(1, Ordering::SeqCst);
		if self.unavailable {
			return Err(Self::outage());
		}
		let counter = self.inner.read(key).await?;
		if let Some(delay) = self.read_delay {
			tokio::time::sleep(delay).await;
		}
		Ok(counter)
	}

	async fn write_if_version_matches(
		&self,
		key: &str,
		new_quantity: u64,
		expected_version: u64,
	) -> Result<Counter, StoreError> {
		self.versioned_writes.fetch_add(1, Ordering::SeqCst);

		let forced = self
			.forced_conflicts
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.is_ok();
		if forced {
			// Another writer slips in: same quantity, newer version.
			let current = self.inner.read(key).await?;
			self.inner.write_exclusive(key, current.quantity).await?;
		}

		self.inner
			.write_if_version_matches(key, new_quantity, expected_version)
			.await
	}

	async fn write_exclusive(&self, key: &str, new_quantity: u64) -> Result<Counter, StoreError> {
		self.inner.write_exclusive(key, new_quantity).await
	}

	async fn begin<'a>(&'a self) -> Result<Box<dyn UnitOfWork + 'a>, StoreError> {
		if self.unavailable {
			return Err(Self::outage());
		}
		self.inner.begin().await
	}
}

/// Counts acquisitions and releases passing through to the wrapped service.
pub struct CountingLocks<L> {
	pub inner: Arc<L>,
	pub acquired: AtomicUsize,
	pub released: AtomicUsize,
	/// Every call fails as if the service were down.
	pub unavailable: bool,
}

impl<L> CountingLocks<L> {
	pub fn new(inner: Arc<L>) -> Self {
		Self {
			inner,
			acquired: AtomicUsize::new(0),
			released: AtomicUsize::new(0),
			unavailable: false,
		}
	}

	pub fn unavailable(mut self) -> Self {
		self.unavailable = true;
		self
	}

	pub fn acquired(&self) -> usize {
		self.acquired.load(Ordering::SeqCst)
	}

	pub fn released(&self) -> usize {
		self.released.load(Ordering::SeqCst)
	}

	fn check(&self) -> Result<(), StoreError> {
		if self.unavailable {
			return Err(StoreError::Unavailable {
				reason: "cache down".to_string(),
			});
		}
		Ok(())
	}

	fn count(&self, acquired: bool) -> bool {
		if acquired {
			self.acquired.fetch_add(1, Ordering::SeqCst);
		}
		acquired
	}
}

#[async_trait]
impl NamedLocks for CountingLocks<MemoryNamedLocks> {
	async fn get_lock(&self, name: &str, session: &str, timeout: Duration) -> Result<bool, StoreError> {
		self.check()?;
		let acquired = self.inner.get_lock(name, session, timeout).await?;
		Ok(self.count(acquired))
	}

	async fn release_lock(&self, name: &str, session: &str) -> Result<bool, StoreError> {
		self.released.fetch_add(1, Ordering::SeqCst);
		self.inner.release_lock(name, session).await
	}
}

#[async_trait]
impl CoordinationCache for CountingLocks<MemoryCache> {
	async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
		self.check()?;
		let acquired = self.inner.set_if_absent(key, value, ttl).await?;
		Ok(self.count(acquired))
	}

	async fn delete(&self, key: &str) -> Result<bool, StoreError> {
		self.released.fetch_add(1, Ordering::SeqCst);
		self.inner.delete(key).await
	}

	async fn delete_if_equals(&self, key: &str, value: &str) -> Result<bool, StoreError> {
		self.released.fetch_add(1, Ordering::SeqCst);
		self.inner.delete_if_equals(key, value).await
	}
}

#[async_trait]
impl LockService for CountingLocks<MemoryCache> {
	async fn acquire_lock(
		&self,
		key: &str,
		owner: &str,
		wait_time: Duration,
		lease_time: Duration,
	) -> Result<bool, StoreError> {
		self.check()?;
		let acquired = self
			.inner
			.acquire_lock(key, owner, wait_time, lease_time)
			.await?;
		Ok(self.count(acquired))
	}

	async fn release_lock(&self, key: &str, owner: &str) -> Result<bool, StoreError> {
		self.released.fetch_add(1, Ordering::SeqCst);
		self.inner.release_lock(key, owner).await
	}
}
