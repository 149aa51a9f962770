//! Storage layer for rosterdb.
//!
//! A sled-backed store holding one tree per entity type. This is the adapter
//! the search core reads through; it owns durability and iteration order, the
//! core owns neither.

mod config;
mod engine;
mod record;

pub mod key;

pub use config::StorageConfig;
pub use engine::StorageEngine;
pub use key::EntityKey;
pub use record::StoredRecord;
