/* src/strategy/owner.rs */

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Issues a distinct owner id per lock attempt.
///
/// Ids look like `<label>-<pid>-<instance>-<seq>`, so concurrent attempts from
/// one strategy instance never pass for the same holder.
pub(crate) struct OwnerIds {
	prefix: String,
	next: AtomicU64,
}

impl OwnerIds {
	pub(crate) fn new(label: &str) -> Self {
		let instance = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
		Self {
			prefix: format!("{}-{}-{}", label, std::process::id(), instance),
			next: AtomicU64::new(1),
		}
	}

	pub(crate) fn next(&self) -> String {
		let seq = self.next.fetch_add(1, Ordering::Relaxed);
		format!("{}-{}", self.prefix, seq)
	}
}
