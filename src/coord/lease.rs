/* src/coord/lease.rs */

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tokio::time::Instant;

/// Capacity of the release notification channel.
const RELEASE_CHANNEL_CAPACITY: usize = 256;

struct Lease {
	owner: String,
	expires_at: Option<Instant>,
}

impl Lease {
	fn is_expired(&self, now: Instant) -> bool {
		self.expires_at.is_some_and(|at| now >= at)
	}
}

/// Owner-tagged entries with optional expiry, and a channel announcing releases.
///
/// Shared by the in-memory named locks and cache.
pub(crate) struct LeaseTable {
	entries: Mutex<HashMap<String, Lease>>,
	released: broadcast::Sender<String>,
}

impl LeaseTable {
	pub(crate) fn new() -> Self {
		Self {
			entries: Mutex::new(HashMap::new()),
			released: broadcast::channel(RELEASE_CHANNEL_CAPACITY).0,
		}
	}

	/// Takes `key` if it is free or its lease expired.
	///
	/// On failure returns the current holder's expiry, if it has one.
	async fn try_take(
		&self,
		key: &str,
		owner: &str,
		lease: Option<Duration>,
	) -> Result<(), Option<Instant>> {
		let mut entries = self.entries.lock().await;
		let now = Instant::now();

		if let Some(current) = entries.get(key)
			&& !current.is_expired(now)
		{
			return Err(current.expires_at);
		}

		let lease = Lease {
			owner: owner.to_string(),
			expires_at: lease.map(|d| now + d),
		};
		if let Some(previous) = entries.insert(key.to_string(), lease) {
			tracing::debug!(key = %key, previous = %previous.owner, owner = %owner, "took over expired lease");
		}
		Ok(())
	}

	/// Takes `key` without waiting.
	pub(crate) async fn try_acquire(&self, key: &str, owner: &str, lease: Option<Duration>) -> bool {
		self.try_take(key, owner, lease).await.is_ok()
	}

	/// Takes `key`, waiting up to `wait` (forever if `None`).
	///
	/// Waiters sleep until a release of `key` is announced, the holder's lease
	/// runs out, or the wait elapses, whichever comes first.
	pub(crate) async fn acquire(
		&self,
		key: &str,
		owner: &str,
		wait: Option<Duration>,
		lease: Option<Duration>,
	) -> bool {
		let deadline = wait.map(|w| Instant::now() + w);
		// Subscribe before the first attempt so a release in between is not missed.
		let mut released = self.released.subscribe();

		loop {
			let holder_expiry = match self.try_take(key, owner, lease).await {
				Ok(()) => return true,
				Err(expiry) => expiry,
			};

			if deadline.is_some_and(|d| Instant::now() >= d) {
				return false;
			}

			match [deadline, holder_expiry].into_iter().flatten().min() {
				Some(wake_at) => {
					let _ = tokio::time::timeout_at(wake_at, wait_for_release(&mut released, key)).await;
				}
				None => wait_for_release(&mut released, key).await,
			}
		}
	}

	/// Removes `key` if `owner` holds it.
	///
	/// Returns `true` only if the lease was still live; an expired entry left
	/// behind by `owner` is cleaned up and reported as `false`.
	pub(crate) async fn release(&self, key: &str, owner: &str) -> bool {
		let mut entries = self.entries.lock().await;
		let live = match entries.get(key) {
			Some(current) if current.owner == owner => !current.is_expired(Instant::now()),
			_ => return false,
		};
		entries.remove(key);
		drop(entries);

		let _ = self.released.send(key.to_string());
		live
	}

	/// Removes `key` regardless of owner. Returns whether a live entry existed.
	pub(crate) async fn remove(&self, key: &str) -> bool {
		let mut entries = self.entries.lock().await;
		let live = match entries.remove(key) {
			Some(lease) => !lease.is_expired(Instant::now()),
			None => return false,
		};
		drop(entries);

		let _ = self.released.send(key.to_string());
		live
	}

	/// Removes every entry held by `owner`. Returns how many were live.
	pub(crate) async fn release_all(&self, owner: &str) -> usize {
		let mut entries = self.entries.lock().await;
		let now = Instant::now();
		let keys: Vec<String> = entries
			.iter()
			.filter(|(_, lease)| lease.owner == owner)
			.map(|(key, _)| key.clone())
			.collect();

		let mut live = 0;
		for key in &keys {
			if let Some(lease) = entries.remove(key)
				&& !lease.is_expired(now)
			{
				live += 1;
			}
		}
		drop(entries);

		for key in keys {
			let _ = self.released.send(key);
		}
		live
	}

	/// Returns the owner of a live lease on `key`.
	pub(crate) async fn holder(&self, key: &str) -> Option<String> {
		let entries = self.entries.lock().await;
		entries
			.get(key)
			.filter(|lease| !lease.is_expired(Instant::now()))
			.map(|lease| lease.owner.clone())
	}
}

async fn wait_for_release(released: &mut broadcast::Receiver<String>, key: &str) {
	loop {
		match released.recv().await {
			Ok(k) if k == key => return,
			Ok(_) => continue,
			// Missed notifications; let the caller re-check.
			Err(broadcast::error::RecvError::Lagged(_)) => return,
			Err(broadcast::error::RecvError::Closed) => return,
		}
	}
}
