//! SQLite Backend for the SMS Content Store
//!
//! Mirrors the provider's `sms` table. Rows in every box share the table and
//! are told apart by the `type` column.
//!
//! ## Database Schema
//!
//! ```sql
//! CREATE TABLE sms (
//!     _id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     type INTEGER NOT NULL,
//!     address TEXT,
//!     body TEXT,
//!     date INTEGER,
//!     date_sent INTEGER,
//!     read INTEGER NOT NULL DEFAULT 0
//! );
//! ```
//!
//! ## Storage Location
//!
//! Default path: `~/.local/share/sms-bridge/sms.db`

use super::{ContentStore, RowUri};
use crate::message::{columns, ColumnValue};
use crate::{BridgeError, MessageBox, Result, StoreRow};
use rusqlite::types::ToSql;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// SQLite-backed SMS content store
pub struct SqliteSmsStore {
    conn: Arc<Mutex<Connection>>,
    api_level: u32,
}

impl SqliteSmsStore {
    /// Open or create the store at an explicit path
    pub fn open(db_path: &Path, api_level: u32) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        info!("Opened SMS store at {}", db_path.display());
        Self::from_connection(conn, api_level)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory(api_level: u32) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, api_level)
    }

    fn from_connection(conn: Connection, api_level: u32) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            api_level,
        };

        store.init_schema()?;
        Ok(store)
    }

    /// Get the default database path
    pub fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir().ok_or_else(|| {
            BridgeError::Configuration("Could not determine local data directory".to_string())
        })?;
        Ok(data_dir.join("sms-bridge").join("sms.db"))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sms (
                _id INTEGER PRIMARY KEY AUTOINCREMENT,
                type INTEGER NOT NULL,
                address TEXT,
                body TEXT,
                date INTEGER,
                date_sent INTEGER,
                read INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_sms_type ON sms(type);
            "#,
        )?;

        debug!("SMS store schema initialized");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| BridgeError::Database(format!("Lock error: {}", e)))
    }

    /// Insert a row and return its `_id`
    pub fn try_insert(&self, destination: MessageBox, row: &StoreRow) -> Result<i64> {
        let row_columns = row.columns();
        let type_code = ColumnValue::Integer(i64::from(destination.type_code()));

        let mut names = vec![columns::TYPE];
        names.extend(row_columns.iter().map(|(name, _)| *name));

        let placeholders = (1..=names.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO sms ({}) VALUES ({})",
            names.join(", "),
            placeholders
        );

        let values: Vec<&dyn ToSql> = std::iter::once(&type_code as &dyn ToSql)
            .chain(row_columns.iter().map(|(_, value)| value as &dyn ToSql))
            .collect();

        let conn = self.lock()?;
        conn.execute(&sql, values.as_slice())?;
        Ok(conn.last_insert_rowid())
    }
}

impl ContentStore for SqliteSmsStore {
    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn insert(&self, destination: MessageBox, row: &StoreRow) -> Option<RowUri> {
        match self.try_insert(destination, row) {
            Ok(id) => Some(RowUri::new(destination, id)),
            Err(e) => {
                warn!("SMS store insert into {} failed: {}", destination, e);
                None
            }
        }
    }
}
