/* src/counter/decrement.rs */

use super::{Counter, InsufficientStock};

/// Computes the counter that results from taking `amount` units out of `counter`.
///
/// Pure: nothing is written. On `Err` the caller must leave the store untouched.
pub fn apply(counter: &Counter, amount: u64) -> Result<Counter, InsufficientStock> {
	let quantity = counter
		.quantity
		.checked_sub(amount)
		.ok_or_else(|| InsufficientStock {
			key: counter.key.clone(),
			available: counter.quantity,
			requested: amount,
		})?;

	Ok(Counter {
		key: counter.key.clone(),
		quantity,
		version: counter.version + 1,
	})
}
