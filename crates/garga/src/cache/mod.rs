//! Local item cache - persisted item records keyed by tracker id.
//!
//! The cache is advisory: it exists to ease load on the tracker, and any
//! retrieval failure makes the client fall back to a live fetch. Records are
//! persisted as field values; retrieval constructs a fresh [`Item`].

mod sqlite;

pub use sqlite::SqliteItemCache;

use thiserror::Error;

use crate::extract::Item;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("No cached item with id {0}")]
    NotFound(u32),

    #[error("Cached record for item {id} is malformed: {reason}")]
    Integrity { id: u32, reason: String },

    #[error("Database error: {0}")]
    Database(String),
}

/// Trait for item cache storage.
pub trait ItemCache: Send + Sync {
    /// Retrieve the persisted record for an id.
    ///
    /// `NotFound` when no row exists; `Integrity` when the row cannot be
    /// reconstructed into a record.
    fn retrieve(&self, id: u32) -> Result<Item, CacheError>;

    /// Upsert an item's scalar fields and replace its file rows, atomically.
    fn store(&self, item: &Item) -> Result<(), CacheError>;
}
