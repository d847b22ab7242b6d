/* src/strategy/guard.rs */

use std::future::Future;
use std::pin::Pin;

type ReleaseFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Holds the release of an acquired lock until it is awaited.
///
/// Strategies call [`release`](ReleaseGuard::release) on every return path.
/// If the surrounding future is dropped first, the release is spawned on the
/// current runtime instead; without a runtime the lock's lease bounds the leak.
pub(crate) struct ReleaseGuard {
	release: Option<ReleaseFuture>,
}

impl ReleaseGuard {
	pub(crate) fn new(release: impl Future<Output = ()> + Send + 'static) -> Self {
		Self {
			release: Some(Box::pin(release)),
		}
	}

	pub(crate) async fn release(mut self) {
		if let Some(release) = self.release.take() {
			release.await;
		}
	}
}

impl Drop for ReleaseGuard {
	fn drop(&mut self) {
		if let Some(release) = self.release.take() {
			match tokio::runtime::Handle::try_current() {
				Ok(handle) => {
					tracing::debug!("decrease cancelled while holding a lock, releasing in background");
					handle.spawn(release);
				}
				Err(_) => tracing::warn!("decrease cancelled outside a runtime, lock left to its lease"),
			}
		}
	}
}
