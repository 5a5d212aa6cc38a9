//! SMS Content Store
//!
//! The content store is the operating system's shared SMS database, addressed
//! by box URI. This module defines the seam the inserter writes through and
//! ships two implementations:
//!
//! - [`SqliteSmsStore`]: a SQLite database with the provider's `sms` table
//! - [`MemoryStore`]: an in-process recorder
//!
//! Inserts are atomic per row: a store either returns the new row's URI or
//! nothing at all.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteSmsStore;

use crate::{MessageBox, StoreRow};
use std::fmt;

/// URI of a newly inserted row, e.g. `content://sms/sent/42`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowUri(String);

impl RowUri {
    pub fn new(destination: MessageBox, row_id: i64) -> Self {
        Self(format!("{}/{}", destination.content_uri(), row_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Destination for decoded SMS rows
///
/// Implementations own their concurrency; callers hold no lock across
/// inserts.
pub trait ContentStore: Send + Sync {
    /// API level of the host the store belongs to
    fn api_level(&self) -> u32;

    /// Insert one row into `destination`
    ///
    /// Returns `None` when the store refuses the row (permission denied,
    /// provider unavailable, schema mismatch).
    fn insert(&self, destination: MessageBox, row: &StoreRow) -> Option<RowUri>;
}

impl<S: ContentStore + ?Sized> ContentStore for std::sync::Arc<S> {
    fn api_level(&self) -> u32 {
        (**self).api_level()
    }

    fn insert(&self, destination: MessageBox, row: &StoreRow) -> Option<RowUri> {
        (**self).insert(destination, row)
    }
}
