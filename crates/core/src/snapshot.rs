//! Contract snapshot reader: point-in-time view of a pot as the contract reports it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::PotId;

/// The contract's current pot record, as returned by `getPot(potId)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotSnapshot {
    pub name: String,
    pub token: Address,
    pub entry_amount: U256,
    pub period: U256,
    pub max_participants: U256,
    pub is_public: bool,
    pub round: U256,
    pub deadline: U256,
    pub balance: U256,
    pub total_participants: U256,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("pot {0} not visible on-chain")]
    PotNotFound(PotId),
    #[error("contract call failed: {0}")]
    CallFailed(String),
}

/// Synchronous accessor for the contract's `getPot` view.
///
/// Implementations read against the emitting contract's address; they must not cache
/// across calls since the indexer relies on the value being current for the log being
/// processed.
pub trait PotReader {
    fn get_pot(&self, contract: Address, pot_id: PotId) -> Result<PotSnapshot, SnapshotError>;
}

impl<R: PotReader + ?Sized> PotReader for &R {
    fn get_pot(&self, contract: Address, pot_id: PotId) -> Result<PotSnapshot, SnapshotError> {
        (**self).get_pot(contract, pot_id)
    }
}

impl<R: PotReader + ?Sized> PotReader for Box<R> {
    fn get_pot(&self, contract: Address, pot_id: PotId) -> Result<PotSnapshot, SnapshotError> {
        (**self).get_pot(contract, pot_id)
    }
}

/// In-memory reader, keyed by pot id. Clones share the same table, so a test or a
/// replay harness can keep a handle and update snapshots between events.
#[derive(Debug, Clone, Default)]
pub struct MemoryPotReader {
    pots: Arc<Mutex<HashMap<PotId, PotSnapshot>>>,
    reads: Arc<AtomicU64>,
}

impl MemoryPotReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the snapshot returned for a pot.
    pub fn set(&self, pot_id: PotId, snapshot: PotSnapshot) {
        if let Ok(mut pots) = self.pots.lock() {
            pots.insert(pot_id, snapshot);
        }
    }

    /// Update a stored snapshot in place. Returns false if the pot is unknown.
    pub fn update<F>(&self, pot_id: PotId, f: F) -> bool
    where
        F: FnOnce(&mut PotSnapshot),
    {
        match self.pots.lock() {
            Ok(mut pots) => match pots.get_mut(&pot_id) {
                Some(snapshot) => {
                    f(snapshot);
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    pub fn remove(&self, pot_id: PotId) {
        if let Ok(mut pots) = self.pots.lock() {
            pots.remove(&pot_id);
        }
    }

    /// Total number of `get_pot` calls served.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl PotReader for MemoryPotReader {
    fn get_pot(&self, _contract: Address, pot_id: PotId) -> Result<PotSnapshot, SnapshotError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let pots = self
            .pots
            .lock()
            .map_err(|e| SnapshotError::CallFailed(e.to_string()))?;
        let snapshot = pots
            .get(&pot_id)
            .cloned()
            .ok_or(SnapshotError::PotNotFound(pot_id))?;
        debug!(pot = %pot_id, round = %snapshot.round, balance = %snapshot.balance, "snapshot read");
        Ok(snapshot)
    }
}
