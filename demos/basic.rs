/* demos/basic.rs */

//! Example: 100 concurrent decrements of one counter, once per strategy
//!
//! Every strategy should end at zero with exactly 100 successes.
//!
//! Run with: cargo run --example basic --features full

use std::sync::Arc;
use std::time::Instant;

use stockguard::coord::{MemoryCache, MemoryNamedLocks};
use stockguard::store::MemoryCounterStore;
use stockguard::{LockConfig, StockFacade, StrategyKind};

const REQUESTS: usize = 100;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	for kind in StrategyKind::ALL {
		// 1. Fresh store with one counter
		let store = Arc::new(MemoryCounterStore::new());
		store.insert("1", REQUESTS as u64)?;

		// 2. Facade wired with in-memory coordination services
		let cache = Arc::new(MemoryCache::new());
		let facade = StockFacade::builder()
			.store(store.clone())
			.named_locks(Arc::new(MemoryNamedLocks::new()))
			.cache(cache.clone())
			.lock_service(cache)
			.config(LockConfig {
				spin_interval_ms: 5,
				retry_backoff_ms: 5,
				..LockConfig::for_strategy(kind)
			})
			.build()?;

		// 3. Fire every request at once
		let started = Instant::now();
		let handles: Vec<_> = (0..REQUESTS)
			.map(|_| {
				let facade = facade.clone();
				tokio::spawn(async move { facade.decrease("1", 1).await })
			})
			.collect();

		let mut succeeded = 0;
		for handle in handles {
			if handle.await?.is_ok() {
				succeeded += 1;
			}
		}

		let remaining = store.get("1").map(|c| c.quantity).unwrap_or_default();
		println!(
			"{:<18} succeeded={:<4} remaining={:<4} elapsed={:?}",
			kind.as_str(),
			succeeded,
			remaining,
			started.elapsed()
		);
	}

	Ok(())
}
