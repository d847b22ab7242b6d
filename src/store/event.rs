/* src/store/event.rs */

use std::sync::Arc;

use crate::counter::Counter;

/// Events emitted by the in-memory store on committed changes.
#[derive(Debug, Clone)]
pub enum CounterEvent {
	/// A counter was inserted or reset.
	Inserted { counter: Arc<Counter> },
	/// A write was committed.
	Updated {
		old: Arc<Counter>,
		new: Arc<Counter>,
	},
	/// A counter was removed.
	Removed { counter: Arc<Counter> },
}
