//! Contract events and the log envelope they arrive in.

use std::fmt;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{PotId, RoundNumber, Timestamp};

/// Position of a log in the chain. Ordered by `(block_number, log_index)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCursor {
    pub block_number: u64,
    pub log_index: u64,
}

impl EventCursor {
    pub fn new(block_number: u64, log_index: u64) -> Self {
        Self {
            block_number,
            log_index,
        }
    }
}

impl fmt::Display for EventCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.block_number, self.log_index)
    }
}

/// Envelope fields carried by every delivered log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    /// Address of the emitting contract.
    pub contract: Address,
    pub block_number: u64,
    pub block_timestamp: Timestamp,
    pub transaction_hash: B256,
    pub log_index: u64,
}

impl EventMeta {
    pub fn cursor(&self) -> EventCursor {
        EventCursor::new(self.block_number, self.log_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotCreated {
    pub pot_id: PotId,
    pub creator: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotJoined {
    pub pot_id: PotId,
    pub round_id: RoundNumber,
    pub user: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotPayout {
    pub pot_id: PotId,
    pub winner: Address,
    pub amount: U256,
    pub round: RoundNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotAllowRequested {
    pub pot_id: PotId,
    pub requestor: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedParticipantAdded {
    pub pot_id: PotId,
    pub user: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotEnded {
    pub pot_id: PotId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Address,
}

/// Every log the Potluck contract emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "params")]
pub enum PotluckEvent {
    PotCreated(PotCreated),
    PotJoined(PotJoined),
    PotPayout(PotPayout),
    PotAllowRequested(PotAllowRequested),
    AllowedParticipantAdded(AllowedParticipantAdded),
    PotEnded(PotEnded),
    OwnershipTransferred(OwnershipTransferred),
}

impl PotluckEvent {
    /// Solidity event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PotCreated(_) => "PotCreated",
            Self::PotJoined(_) => "PotJoined",
            Self::PotPayout(_) => "PotPayout",
            Self::PotAllowRequested(_) => "PotAllowRequested",
            Self::AllowedParticipantAdded(_) => "AllowedParticipantAdded",
            Self::PotEnded(_) => "PotEnded",
            Self::OwnershipTransferred(_) => "OwnershipTransferred",
        }
    }

    /// The pot the event refers to, if any.
    pub fn pot_id(&self) -> Option<PotId> {
        match self {
            Self::PotCreated(e) => Some(e.pot_id),
            Self::PotJoined(e) => Some(e.pot_id),
            Self::PotPayout(e) => Some(e.pot_id),
            Self::PotAllowRequested(e) => Some(e.pot_id),
            Self::AllowedParticipantAdded(e) => Some(e.pot_id),
            Self::PotEnded(e) => Some(e.pot_id),
            Self::OwnershipTransferred(_) => None,
        }
    }

    /// Event parameters as a JSON object keyed by the Solidity parameter names.
    pub fn params(&self) -> serde_json::Value {
        let value = match self {
            Self::PotCreated(e) => serde_json::to_value(e),
            Self::PotJoined(e) => serde_json::to_value(e),
            Self::PotPayout(e) => serde_json::to_value(e),
            Self::PotAllowRequested(e) => serde_json::to_value(e),
            Self::AllowedParticipantAdded(e) => serde_json::to_value(e),
            Self::PotEnded(e) => serde_json::to_value(e),
            Self::OwnershipTransferred(e) => serde_json::to_value(e),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

/// A decoded event together with its log envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEvent {
    pub meta: EventMeta,
    pub event: PotluckEvent,
}

impl IndexedEvent {
    pub fn new(meta: EventMeta, event: PotluckEvent) -> Self {
        Self { meta, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_ordering() {
        assert!(EventCursor::new(10, 5) < EventCursor::new(11, 0));
        assert!(EventCursor::new(10, 5) < EventCursor::new(10, 6));
        assert_eq!(EventCursor::new(3, 1).to_string(), "(3, 1)");
    }

    #[test]
    fn test_event_params_use_solidity_names() {
        let event = PotluckEvent::PotJoined(PotJoined {
            pot_id: U256::from(7u64),
            round_id: U256::from(2u64),
            user: Address::from([0x22; 20]),
        });
        assert_eq!(event.name(), "PotJoined");
        assert_eq!(event.pot_id(), Some(U256::from(7u64)));

        let params = event.params();
        assert!(params.get("potId").is_some());
        assert!(params.get("roundId").is_some());
        assert!(params.get("user").is_some());
    }

    #[test]
    fn test_ownership_event_has_no_pot() {
        let event = PotluckEvent::OwnershipTransferred(OwnershipTransferred {
            previous_owner: Address::ZERO,
            new_owner: Address::from([0x01; 20]),
        });
        assert_eq!(event.pot_id(), None);
        assert!(event.params().get("newOwner").is_some());
    }

    #[test]
    fn test_indexed_event_serde() {
        let indexed = IndexedEvent::new(
            EventMeta {
                contract: Address::from([0x99; 20]),
                block_number: 12,
                block_timestamp: 1_700_000_000,
                transaction_hash: B256::from([0x05; 32]),
                log_index: 3,
            },
            PotluckEvent::PotEnded(PotEnded {
                pot_id: U256::from(1u64),
            }),
        );
        let json = serde_json::to_string(&indexed).unwrap();
        let parsed: IndexedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, indexed);
        assert_eq!(parsed.meta.cursor(), EventCursor::new(12, 3));
    }
}
