//! `taskgrid-store`: Dataset consistency store.
//!
//! Holds the three entity collections plus rules and priorities, derives
//! `is_data_loaded`, and persists through an injected [`Storage`] backend.
//! Implements [`taskgrid_recon::DatasetSink`] so a committed review session
//! publishes straight into it.

pub mod error;
pub mod model;
pub mod storage;
pub mod store;

pub use error::StoreError;
pub use model::{DatasetState, Priorities, Rule, RuleType};
pub use storage::{JsonFileStorage, MemoryStorage, Storage, STATE_KEY};
pub use store::DatasetStore;
