/* src/strategy/error.rs */

use std::time::Duration;

use thiserror::Error;

use crate::counter::InsufficientStock;
use crate::store::StoreError;

/// Failure to obtain the right to mutate a counter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
	/// The bounded wait for the lock elapsed. Nothing was written.
	#[error("timed out after {waited:?} waiting for the lock on {key}")]
	Timeout { key: String, waited: Duration },
	/// Versioned writes kept conflicting until the attempt limit was reached.
	#[error("gave up on {key} after {attempts} conflicting writes")]
	RetriesExhausted { key: String, attempts: u32 },
}

/// Outcome of a failed [`decrease`](super::LockStrategy::decrease).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecreaseError {
	#[error(transparent)]
	InsufficientStock(#[from] InsufficientStock),

	#[error("lock error: {0}")]
	Lock(#[from] LockError),

	#[error("store error: {0}")]
	Store(#[from] StoreError),
}

impl DecreaseError {
	/// True when the business rule rejected the decrement.
	pub fn is_insufficient_stock(&self) -> bool {
		matches!(self, DecreaseError::InsufficientStock(_))
	}

	/// True when the lock could not be obtained in time.
	pub fn is_lock_error(&self) -> bool {
		matches!(self, DecreaseError::Lock(_))
	}
}
