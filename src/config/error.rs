/* src/config/error.rs */

use thiserror::Error;

/// Errors that can occur while loading a [`LockConfig`](super::LockConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("parse error: {0}")]
	Parse(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("validation failed: {0}")]
	Validation(#[from] validator::ValidationErrors),

	#[error("unsupported config format: {0}")]
	UnsupportedFormat(String),
}
