/* src/config/mod.rs */

//!
//! Strategy selection and tuning.
//!
//! With the `config` feature, [`LockConfig`] can be read from TOML or JSON
//! and is validated on load.

#[cfg(feature = "config")]
mod error;
#[cfg(feature = "config")]
mod load;

#[cfg(feature = "config")]
pub use error::ConfigError;

use std::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "config")]
use validator::Validate;

use crate::strategy::StrategyKind;

/// Which strategy to run and how it waits, retries and leases.
///
/// All durations are in milliseconds. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize, Validate))]
#[cfg_attr(feature = "config", serde(default))]
pub struct LockConfig {
	/// Strategy used by the facade.
	pub strategy: StrategyKind,

	/// Pause after a version conflict before the optimistic strategy retries.
	pub retry_backoff_ms: u64,

	/// Write attempts before the optimistic strategy gives up. Unlimited if unset.
	#[cfg_attr(feature = "config", validate(range(min = 1)))]
	pub max_attempts: Option<u32>,

	/// Bound on the wait for a named lock.
	#[cfg_attr(feature = "config", validate(range(min = 1)))]
	pub named_lock_timeout_ms: u64,

	/// Pause between spin lock attempts.
	#[cfg_attr(feature = "config", validate(range(min = 1)))]
	pub spin_interval_ms: u64,

	/// Lifetime of the spin lock's cache entry.
	#[cfg_attr(feature = "config", validate(range(min = 1)))]
	pub spin_lease_ms: u64,

	/// Optional bound on the spin lock wait. Spins forever if unset.
	pub spin_timeout_ms: Option<u64>,

	/// Bound on the wait for the pub/sub lock.
	#[cfg_attr(feature = "config", validate(range(min = 1)))]
	pub pubsub_wait_ms: u64,

	/// Lease after which an unreleased pub/sub lock expires.
	#[cfg_attr(feature = "config", validate(range(min = 1)))]
	pub pubsub_lease_ms: u64,

	/// Optional bound on the wait for the in-process mutex.
	pub mutex_timeout_ms: Option<u64>,
}

impl Default for LockConfig {
	fn default() -> Self {
		Self {
			strategy: StrategyKind::default(),
			retry_backoff_ms: 50,
			max_attempts: None,
			named_lock_timeout_ms: 3000,
			spin_interval_ms: 100,
			spin_lease_ms: 3000,
			spin_timeout_ms: None,
			pubsub_wait_ms: 10_000,
			pubsub_lease_ms: 1000,
			mutex_timeout_ms: None,
		}
	}
}

impl LockConfig {
	/// Default tuning for `strategy`.
	pub fn for_strategy(strategy: StrategyKind) -> Self {
		Self {
			strategy,
			..Self::default()
		}
	}

	pub fn retry_backoff(&self) -> Duration {
		Duration::from_millis(self.retry_backoff_ms)
	}

	pub fn named_lock_timeout(&self) -> Duration {
		Duration::from_millis(self.named_lock_timeout_ms)
	}

	pub fn spin_interval(&self) -> Duration {
		Duration::from_millis(self.spin_interval_ms)
	}

	pub fn spin_lease(&self) -> Duration {
		Duration::from_millis(self.spin_lease_ms)
	}

	pub fn spin_timeout(&self) -> Option<Duration> {
		self.spin_timeout_ms.map(Duration::from_millis)
	}

	pub fn pubsub_wait(&self) -> Duration {
		Duration::from_millis(self.pubsub_wait_ms)
	}

	pub fn pubsub_lease(&self) -> Duration {
		Duration::from_millis(self.pubsub_lease_ms)
	}

	pub fn mutex_timeout(&self) -> Option<Duration> {
		self.mutex_timeout_ms.map(Duration::from_millis)
	}
}
