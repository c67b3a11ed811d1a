// ABOUTME: Opens the SQLite database backing the document store and creates its schema.
// ABOUTME: Hands out UserStore and RecordStore handles that share one guarded connection.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::error::StoreError;
use crate::records::RecordStore;
use crate::users::UserStore;

pub(crate) type SharedConnection = Arc<Mutex<Connection>>;

/// A handle to the opened database. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    conn: SharedConnection,
}

impl Database {
    /// Open or create the database file at the given path, creating parent
    /// directories as needed, and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    /// Open a private in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS records (
                record_id TEXT PRIMARY KEY,
                slot INTEGER NOT NULL DEFAULT 1 UNIQUE CHECK (slot = 1),
                document TEXT NOT NULL
            );",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Credential store hashing new passwords at the given bcrypt cost.
    pub fn users(&self, hash_cost: u32) -> UserStore {
        UserStore::new(Arc::clone(&self.conn), hash_cost)
    }

    pub fn records(&self) -> RecordStore {
        RecordStore::new(Arc::clone(&self.conn))
    }
}

pub(crate) fn lock(conn: &SharedConnection) -> Result<MutexGuard<'_, Connection>, StoreError> {
    conn.lock().map_err(|_| StoreError::Poisoned)
}
