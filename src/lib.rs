/* src/lib.rs */

//!
//! Decrement shared stock counters without going negative and without
//! losing updates to a race.
//!
//! This crate is organized as:
//!
//! - **counter**: The counter record and the pure decrement rule.
//! - **store**: The counter store contract and an in-memory store.
//! - **coord**: Named locks, cache and lock service contracts, with
//!   in-memory implementations.
//! - **strategy**: Six interchangeable locking strategies.
//! - **facade**: `StockFacade`, one `decrease(key, amount)` entry point.
//! - **config**: Strategy selection and tuning (`LockConfig`).
//!
//! ## Feature Flags
//!
//! - `memory` (default): In-memory store, named locks and cache.
//! - `config` (default): Load `LockConfig` from TOML or JSON with validation.
//! - `events`: Broadcast committed changes from `MemoryCounterStore`.
//! - `full`: Enables all features.
//!
//! ## Basic Usage
//!
//! See `demos/basic.rs` for a complete example.

pub mod config;
pub mod coord;
pub mod counter;
pub mod facade;
pub mod store;
pub mod strategy;

pub use config::LockConfig;
pub use counter::{Counter, InsufficientStock};
pub use facade::{FacadeError, StockFacade, StockFacadeBuilder};
pub use store::{CounterStore, StoreError, UnitOfWork};
pub use strategy::{DecreaseError, LockError, LockStrategy, StrategyKind};
