use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use crate::{LedgerResult, WalletStore};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const STATE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS state (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL
);
"#;

/// SQLite-backed state store used by the long-running binary.
#[derive(Clone, Debug)]
pub struct SqliteWalletStore {
    path: PathBuf,
}

impl SqliteWalletStore {
    pub fn new(path: impl Into<PathBuf>) -> LedgerResult<Self> {
        let store = Self { path: path.into() };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> LedgerResult<()> {
        let conn = self.connect()?;
        conn.execute_batch(STATE_SCHEMA)?;
        Ok(())
    }

    fn connect(&self) -> LedgerResult<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = FULL;")?;
        Ok(conn)
    }
}

impl WalletStore for SqliteWalletStore {
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let conn = self.connect()?;
        let value = conn
            .query_row("SELECT value FROM state WHERE key = ?1", params![key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn contains(&self, key: &str) -> LedgerResult<bool> {
        let conn = self.connect()?;
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM state WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&self, key: &str, value: &[u8]) -> LedgerResult<bool> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "INSERT INTO state (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO NOTHING",
            params![key, value],
        )?;
        Ok(changed == 1)
    }
}
