//! SQLite backend: one `entities` table holding JSON documents.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use crate::{EntityStore, Result, StoreError, Write};

pub struct SqliteStore {
    db: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self> {
        debug!("Opening entity store at {}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(db: Connection) -> Result<Self> {
        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS entities (
                kind TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (kind, id)
            );",
        )?;
        Ok(Self { db })
    }
}

impl EntityStore for SqliteStore {
    fn load(&self, kind: &str, id: &str) -> Result<Option<Value>> {
        let data: Option<String> = self
            .db
            .query_row(
                "SELECT data FROM entities WHERE kind = ?1 AND id = ?2",
                params![kind, id],
                |row| row.get(0),
            )
            .optional()?;
        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    fn write_batch(&mut self, writes: Vec<Write>) -> Result<()> {
        let tx = self.db.transaction()?;
        for write in &writes {
            let data = serde_json::to_string(&write.data)?;
            tx.execute(
                "INSERT OR REPLACE INTO entities (kind, id, data) VALUES (?1, ?2, ?3)",
                params![write.kind, write.id, data],
            )?;
        }
        tx.commit()?;
        debug!(writes = writes.len(), "batch committed");
        Ok(())
    }

    fn list(&self, kind: &str) -> Result<Vec<Value>> {
        let mut stmt = self
            .db
            .prepare("SELECT data FROM entities WHERE kind = ?1 ORDER BY id")?;
        let rows = stmt
            .query_map([kind], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.iter()
            .map(|data| serde_json::from_str(data).map_err(StoreError::from))
            .collect()
    }

    fn count(&self, kind: &str) -> Result<usize> {
        let count: i64 = self.db.query_row(
            "SELECT COUNT(*) FROM entities WHERE kind = ?1",
            [kind],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
