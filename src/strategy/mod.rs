/* src/strategy/mod.rs */

//!
//! Interchangeable ways to decrement a counter under mutual exclusion.
//!
//! | Strategy | Excludes within |
//! |---|---|
//! | [`InProcessMutexStrategy`] | one strategy instance (one process) |
//! | [`OptimisticStrategy`] | the store, by version check at write time |
//! | [`PessimisticStrategy`] | the store, by row lock |
//! | [`NamedLockStrategy`] | the store, by advisory named lock |
//! | [`SpinLockStrategy`] | the cache cluster, by polling set-if-absent |
//! | [`PubSubLockStrategy`] | the cache cluster, by notified lock |
//!
//! Only one strategy should touch a given key in a deployment; mixing them
//! reopens the races each one closes.

mod error;
mod guard;
mod in_process;
mod named_lock;
mod optimistic;
mod owner;
mod pessimistic;
mod pubsub_lock;
mod spin_lock;

pub use error::{DecreaseError, LockError};
pub use in_process::InProcessMutexStrategy;
pub use named_lock::{DEFAULT_NAMED_LOCK_TIMEOUT, NamedLockStrategy};
pub use optimistic::{DEFAULT_RETRY_BACKOFF, OptimisticStrategy};
pub use pessimistic::PessimisticStrategy;
pub use pubsub_lock::{DEFAULT_LEASE_TIME, DEFAULT_WAIT_TIME, PubSubLockStrategy};
pub use spin_lock::{DEFAULT_SPIN_INTERVAL, DEFAULT_SPIN_LEASE, SpinLockStrategy};

use async_trait::async_trait;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::counter::{self, Counter};
use crate::store::CounterStore;

/// Decrements counters with mutual exclusion.
#[async_trait]
pub trait LockStrategy: Send + Sync {
	/// Which strategy this is.
	fn kind(&self) -> StrategyKind;

	/// Takes `amount` units from the counter at `key`.
	///
	/// Returns the counter as written. On error nothing was written and no
	/// lock is left held.
	async fn decrease(&self, key: &str, amount: u64) -> Result<Counter, DecreaseError>;
}

/// The available strategies, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum StrategyKind {
	InProcessMutex,
	Optimistic,
	#[default]
	Pessimistic,
	NamedLock,
	SpinLock,
	PubSubLock,
}

impl StrategyKind {
	/// Every strategy, in declaration order.
	pub const ALL: [StrategyKind; 6] = [
		StrategyKind::InProcessMutex,
		StrategyKind::Optimistic,
		StrategyKind::Pessimistic,
		StrategyKind::NamedLock,
		StrategyKind::SpinLock,
		StrategyKind::PubSubLock,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			StrategyKind::InProcessMutex => "in_process_mutex",
			StrategyKind::Optimistic => "optimistic",
			StrategyKind::Pessimistic => "pessimistic",
			StrategyKind::NamedLock => "named_lock",
			StrategyKind::SpinLock => "spin_lock",
			StrategyKind::PubSubLock => "pub_sub_lock",
		}
	}
}

impl std::fmt::Display for StrategyKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Read, apply, and write back with a plain exclusive write.
///
/// Only correct while the caller holds exclusive access to `key`.
pub(crate) async fn decrease_exclusive(
	store: &dyn CounterStore,
	key: &str,
	amount: u64,
) -> Result<Counter, DecreaseError> {
	let current = store.read(key).await?;
	let next = counter::apply(&current, amount)?;
	Ok(store.write_exclusive(key, next.quantity).await?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadMode {
	Plain,
	Exclusive,
}

/// Read, apply, and write back inside one unit of work.
///
/// Returns only after the unit has committed. Any error drops the unit,
/// which rolls it back.
pub(crate) async fn decrease_in_unit_of_work(
	store: &dyn CounterStore,
	key: &str,
	amount: u64,
	mode: ReadMode,
) -> Result<Counter, DecreaseError> {
	let mut unit = store.begin().await?;

	let current = match mode {
		ReadMode::Plain => unit.read(key).await?,
		ReadMode::Exclusive => unit.read_for_exclusive_access(key).await?,
	};
	let next = counter::apply(&current, amount)?;

	unit.write(key, next.quantity).await?;
	unit.commit().await?;
	Ok(next)
}
