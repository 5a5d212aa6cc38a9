//! In-memory content store

use super::{ContentStore, RowUri};
use crate::{MessageBox, StoreRow, SMS_SCHEMA_MIN_API_LEVEL};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Content store that records inserted rows in insertion order
///
/// Can be told to refuse inserts or to report an older API level, which
/// makes it the store of choice for exercising failure paths.
#[derive(Debug)]
pub struct MemoryStore {
    rows: Mutex<Vec<(MessageBox, StoreRow)>>,
    api_level: u32,
    refuse: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_api_level(34)
    }

    pub fn with_api_level(api_level: u32) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            api_level,
            refuse: AtomicBool::new(false),
        }
    }

    /// Make subsequent inserts return no row
    pub fn set_refuse_inserts(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Snapshot of all stored rows
    pub fn rows(&self) -> Vec<(MessageBox, StoreRow)> {
        self.rows
            .lock()
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }

    /// Rows stored in one box
    pub fn rows_in(&self, destination: MessageBox) -> Vec<StoreRow> {
        self.rows()
            .into_iter()
            .filter(|(b, _)| *b == destination)
            .map(|(_, row)| row)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for MemoryStore {
    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn insert(&self, destination: MessageBox, row: &StoreRow) -> Option<RowUri> {
        if self.refuse.load(Ordering::SeqCst) || self.api_level < SMS_SCHEMA_MIN_API_LEVEL {
            debug!("Memory store refusing insert into {}", destination);
            return None;
        }

        let mut rows = self.rows.lock().ok()?;
        rows.push((destination, row.clone()));
        Some(RowUri::new(destination, rows.len() as i64))
    }
}
