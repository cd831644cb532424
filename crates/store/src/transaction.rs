//! Unit of work over an [`EntityStore`].
//!
//! Reads go through a per-transaction cache so a handler always sees its own earlier
//! writes. Nothing reaches the backend until [`Transaction::commit`]; dropping the
//! transaction discards every buffered write.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::debug;

use crate::{Entity, EntityKey, EntityStore, Lookup, Result, Write};

type Slot = (&'static str, String);

pub struct Transaction<'a, S: EntityStore + ?Sized> {
    store: &'a mut S,
    loaded: HashMap<Slot, Option<Value>>,
    writes: BTreeMap<Slot, Value>,
}

impl<'a, S: EntityStore + ?Sized> Transaction<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            loaded: HashMap::new(),
            writes: BTreeMap::new(),
        }
    }

    /// Load by key, seeing buffered writes first.
    pub fn get<K: EntityKey>(&mut self, key: &K) -> Result<Lookup<K::Entity>> {
        let kind = <K::Entity as Entity>::KIND;
        let slot = (kind, key.id());

        let value = if let Some(value) = self.writes.get(&slot) {
            Some(value.clone())
        } else if let Some(value) = self.loaded.get(&slot) {
            value.clone()
        } else {
            let value = self.store.load(kind, &slot.1)?;
            self.loaded.insert(slot.clone(), value.clone());
            value
        };

        match value {
            Some(value) => Ok(Lookup::Found(serde_json::from_value(value)?)),
            None => Ok(Lookup::NotFound { kind, id: slot.1 }),
        }
    }

    pub fn contains<K: EntityKey>(&mut self, key: &K) -> Result<bool> {
        Ok(self.get(key)?.is_found())
    }

    /// Buffer an upsert. A later `put` of the same key replaces it.
    pub fn put<E: Entity>(&mut self, entity: &E) -> Result<()> {
        let id = entity.key().id();
        let data = serde_json::to_value(entity)?;
        debug!(kind = E::KIND, id = %id, "entity staged");
        self.writes.insert((E::KIND, id), data);
        Ok(())
    }

    /// Write every staged record in one batch. Returns the number of records written.
    pub fn commit(self) -> Result<usize> {
        let Self { store, writes, .. } = self;
        let batch: Vec<Write> = writes
            .into_iter()
            .map(|((kind, id), data)| Write { kind, id, data })
            .collect();
        let count = batch.len();
        if count > 0 {
            store.write_batch(batch)?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Counter, CounterKey};
    use crate::MemoryStore;

    fn counter(name: &str, value: u64) -> Counter {
        Counter {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_reads_own_writes() {
        let mut store = MemoryStore::new();
        let mut tx = Transaction::new(&mut store);

        let key = CounterKey("a".to_string());
        assert!(!tx.contains(&key).unwrap());

        tx.put(&counter("a", 1)).unwrap();
        match tx.get(&key).unwrap() {
            Lookup::Found(c) => assert_eq!(c.value, 1),
            Lookup::NotFound { .. } => panic!("expected staged counter"),
        }

        tx.put(&counter("a", 2)).unwrap();
        assert_eq!(tx.get(&key).unwrap().tolerate().unwrap().value, 2);
        // restaging one key keeps one write
        assert_eq!(tx.commit().unwrap(), 1);
    }

    #[test]
    fn test_drop_discards_writes() {
        let mut store = MemoryStore::new();
        {
            let mut tx = Transaction::new(&mut store);
            tx.put(&counter("a", 1)).unwrap();
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_commit_persists_batch() {
        let mut store = MemoryStore::new();
        let mut tx = Transaction::new(&mut store);
        tx.put(&counter("a", 1)).unwrap();
        tx.put(&counter("b", 5)).unwrap();
        assert_eq!(tx.commit().unwrap(), 2);

        let b = crate::get(&store, &CounterKey("b".to_string())).unwrap();
        assert_eq!(b, Some(counter("b", 5)));

        let mut tx = Transaction::new(&mut store);
        let mut a = tx.get(&CounterKey("a".to_string())).unwrap().tolerate().unwrap();
        a.value += 10;
        tx.put(&a).unwrap();
        tx.commit().unwrap();

        let a = crate::get(&store, &CounterKey("a".to_string())).unwrap();
        assert_eq!(a.map(|c| c.value), Some(11));
    }

    #[test]
    fn test_empty_commit_writes_nothing() {
        let mut store = MemoryStore::new();
        let tx = Transaction::new(&mut store);
        assert_eq!(tx.commit().unwrap(), 0);
        assert!(store.is_empty());
    }
}
