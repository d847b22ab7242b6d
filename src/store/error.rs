/* src/store/error.rs */

/// Errors reported by a counter store or coordination service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
	/// No counter exists for the key.
	#[error("counter not found: {key}")]
	NotFound { key: String },
	/// A counter already exists for the key.
	#[error("counter already exists: {key}")]
	AlreadyExists { key: String },
	/// A compare-and-swap write saw a different version than expected.
	#[error("version conflict on {key}: expected {expected}, found {actual}")]
	VersionConflict {
		key: String,
		expected: u64,
		actual: u64,
	},
	/// The backend could not be reached.
	#[error("store unavailable: {reason}")]
	Unavailable { reason: String },
}

impl StoreError {
	/// True for errors caused by a concurrent writer, which may succeed on retry.
	///
	/// Everything else, including outages, must be surfaced to the caller.
	pub fn is_contention(&self) -> bool {
		matches!(self, StoreError::VersionConflict { .. })
	}
}
