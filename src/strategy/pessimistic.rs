/* src/strategy/pessimistic.rs */

use std::sync::Arc;

use async_trait::async_trait;

use super::{
	DecreaseError, LockStrategy, ReadMode, StrategyKind, decrease_in_unit_of_work,
};
use crate::counter::Counter;
use crate::store::CounterStore;

/// Takes the store's row lock with the read itself.
///
/// Other decreases of the key wait in the store until this unit of work
/// commits or rolls back, which also releases the lock.
pub struct PessimisticStrategy {
	store: Arc<dyn CounterStore>,
}

impl PessimisticStrategy {
	pub fn new(store: Arc<dyn CounterStore>) -> Self {
		Self { store }
	}
}

#[async_trait]
impl LockStrategy for PessimisticStrategy {
	fn kind(&self) -> StrategyKind {
		StrategyKind::Pessimistic
	}

	async fn decrease(&self, key: &str, amount: u64) -> Result<Counter, DecreaseError> {
		decrease_in_unit_of_work(self.store.as_ref(), key, amount, ReadMode::Exclusive).await
	}
}
