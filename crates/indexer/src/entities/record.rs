//! Bookkeeping entities: raw event log, cursor and contract owner.

use potluck_core::{Address, EventCursor, Timestamp, B256};
use potluck_store::Entity;
use serde::{Deserialize, Serialize};

use crate::keys::{self, CheckpointKey, EventRecordKey, OwnerKey};

/// Immutable copy of a handled log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub name: String,
    pub params: serde_json::Value,
    pub contract: Address,
    pub block_number: u64,
    pub block_timestamp: Timestamp,
    pub transaction_hash: B256,
    pub log_index: u64,
}

impl Entity for EventRecord {
    const KIND: &'static str = "EventRecord";
    type Key = EventRecordKey;

    fn key(&self) -> EventRecordKey {
        keys::event_record(self.transaction_hash, self.log_index)
    }
}

/// Last committed log position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub cursor: EventCursor,
    pub events_processed: u64,
}

impl Checkpoint {
    pub fn advance(&mut self, cursor: EventCursor) {
        self.cursor = cursor;
        self.events_processed += 1;
    }
}

impl Entity for Checkpoint {
    const KIND: &'static str = "Checkpoint";
    type Key = CheckpointKey;

    fn key(&self) -> CheckpointKey {
        CheckpointKey
    }
}

/// Current owner of the Potluck contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractOwner {
    pub owner: Address,
    pub previous_owner: Address,
    pub updated_at: Timestamp,
    pub transaction_hash: B256,
}

impl Entity for ContractOwner {
    const KIND: &'static str = "ContractOwner";
    type Key = OwnerKey;

    fn key(&self) -> OwnerKey {
        OwnerKey
    }
}
