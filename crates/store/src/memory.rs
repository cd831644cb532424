//! In-memory backend.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::{EntityStore, Result, Write};

/// Entity table held in a `BTreeMap` keyed by `(kind, id)`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<(String, String), Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all kinds.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl EntityStore for MemoryStore {
    fn load(&self, kind: &str, id: &str) -> Result<Option<Value>> {
        Ok(self
            .records
            .get(&(kind.to_string(), id.to_string()))
            .cloned())
    }

    fn write_batch(&mut self, writes: Vec<Write>) -> Result<()> {
        for write in writes {
            self.records
                .insert((write.kind.to_string(), write.id), write.data);
        }
        Ok(())
    }

    fn list(&self, kind: &str) -> Result<Vec<Value>> {
        Ok(self
            .records
            .iter()
            .filter(|((k, _), _)| k == kind)
            .map(|(_, value)| value.clone())
            .collect())
    }
}
