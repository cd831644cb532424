//! Potluck Store
//!
//! Keyed entity persistence for the indexer. Entities are serde types addressed by a
//! `(kind, id)` pair; handlers work through a [`Transaction`] that caches loads and
//! buffers writes, then commits them to an [`EntityStore`] backend in one batch.

pub mod memory;
pub mod sqlite;
pub mod transaction;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use transaction::Transaction;

use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A persisted record type.
pub trait Entity: Serialize + DeserializeOwned {
    /// Table / collection name.
    const KIND: &'static str;
    type Key: EntityKey;

    fn key(&self) -> Self::Key;
}

/// Typed key that derives the entity's string id.
pub trait EntityKey: fmt::Debug {
    type Entity: Entity;

    fn id(&self) -> String;
}

/// Outcome of a keyed load. Callers decide per branch whether absence is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound { kind: &'static str, id: String },
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Absence is an ordinary case here (e.g. first reference); skip silently.
    pub fn tolerate(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound { kind, id } => {
                debug!(kind, id = %id, "entity absent");
                None
            }
        }
    }

    /// Absence means an upstream invariant did not hold; report it and skip.
    pub fn or_warn(self, context: &str) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound { kind, id } => {
                warn!(kind, id = %id, context, "invariant: referenced entity missing, skipping update");
                None
            }
        }
    }
}

/// One buffered upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct Write {
    pub kind: &'static str,
    pub id: String,
    pub data: Value,
}

/// Storage engine contract: load one record, or apply a batch of upserts atomically.
pub trait EntityStore {
    fn load(&self, kind: &str, id: &str) -> Result<Option<Value>>;

    /// Apply every write or none of them.
    fn write_batch(&mut self, writes: Vec<Write>) -> Result<()>;

    /// All records of a kind, ordered by id.
    fn list(&self, kind: &str) -> Result<Vec<Value>>;

    fn count(&self, kind: &str) -> Result<usize> {
        Ok(self.list(kind)?.len())
    }
}

/// Load and decode one entity outside a transaction.
pub fn get<S, K>(store: &S, key: &K) -> Result<Option<K::Entity>>
where
    S: EntityStore + ?Sized,
    K: EntityKey,
{
    match store.load(<K::Entity as Entity>::KIND, &key.id())? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Load and decode every entity of a kind.
pub fn all<S, E>(store: &S) -> Result<Vec<E>>
where
    S: EntityStore + ?Sized,
    E: Entity,
{
    store
        .list(E::KIND)?
        .into_iter()
        .map(|value| serde_json::from_value(value).map_err(StoreError::from))
        .collect()
}

/// Either backend, selected at startup from configuration.
pub enum StoreBackend {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl StoreBackend {
    /// SQLite at `path` when given, otherwise an in-memory store.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Ok(Self::Sqlite(SqliteStore::open(path)?)),
            None => Ok(Self::Memory(MemoryStore::new())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

impl EntityStore for StoreBackend {
    fn load(&self, kind: &str, id: &str) -> Result<Option<Value>> {
        match self {
            Self::Memory(store) => store.load(kind, id),
            Self::Sqlite(store) => store.load(kind, id),
        }
    }

    fn write_batch(&mut self, writes: Vec<Write>) -> Result<()> {
        match self {
            Self::Memory(store) => store.write_batch(writes),
            Self::Sqlite(store) => store.write_batch(writes),
        }
    }

    fn list(&self, kind: &str) -> Result<Vec<Value>> {
        match self {
            Self::Memory(store) => store.list(kind),
            Self::Sqlite(store) => store.list(kind),
        }
    }

    fn count(&self, kind: &str) -> Result<usize> {
        match self {
            Self::Memory(store) => store.count(kind),
            Self::Sqlite(store) => store.count(kind),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde::{Deserialize, Serialize};

    use super::{Entity, EntityKey};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Counter {
        pub name: String,
        pub value: u64,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct CounterKey(pub String);

    impl Entity for Counter {
        const KIND: &'static str = "Counter";
        type Key = CounterKey;

        fn key(&self) -> CounterKey {
            CounterKey(self.name.clone())
        }
    }

    impl EntityKey for CounterKey {
        type Entity = Counter;

        fn id(&self) -> String {
            self.0.clone()
        }
    }
}
