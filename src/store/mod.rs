//! Local persistence: a small key-value store with a typed, tolerant
//! collection adapter on top.
//!
//! Reads never fail — missing or corrupt data loads as an empty collection so
//! the engine starts up after partial writes or schema drift. Writes always
//! surface their errors, because a silently lost write would desynchronize
//! in-memory and on-disk state.

mod collection;
mod kv;
pub mod migrate;

pub use collection::{keys, CollectionStore};
pub use kv::{FileStore, KeyValueStore, MemoryStore, StoreError};
