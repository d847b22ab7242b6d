/* src/facade/error.rs */

use thiserror::Error;

/// Errors that can occur while assembling a [`StockFacade`](super::StockFacade).
#[derive(Debug, Error)]
pub enum FacadeError {
	#[error("Builder error: {0}")]
	Builder(String),
}
