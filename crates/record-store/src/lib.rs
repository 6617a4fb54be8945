//! Flat-file record storage.
//!
//! Each collection is a single JSON document holding an array of records in
//! insertion order. Appends rewrite the whole document.

mod error;
mod store;
mod types;

pub use error::StoreError;
pub use store::{InMemoryStore, JsonFileStore, RecordStore, RecordStoreExt};
pub use types::*;
