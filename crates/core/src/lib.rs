//! Potluck Core
//!
//! Types shared by every Potluck indexer crate: the inbound contract events with their
//! log envelope, the chain cursor, and the contract snapshot reader seam.

pub mod event;
pub mod snapshot;

pub use alloy_primitives::{Address, B256, U256};
pub use event::{
    AllowedParticipantAdded, EventCursor, EventMeta, IndexedEvent, OwnershipTransferred,
    PotAllowRequested, PotCreated, PotEnded, PotJoined, PotPayout, PotluckEvent,
};
pub use snapshot::{MemoryPotReader, PotReader, PotSnapshot, SnapshotError};

use thiserror::Error;

/// Pot identifier as emitted by the contract (`uint256`).
pub type PotId = U256;

/// Round number within a pot (`uint256`).
pub type RoundNumber = U256;

/// Block timestamp in unix seconds.
pub type Timestamp = u64;

/// Errors from decoding identifiers supplied as text (config files, command lines).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },
}

/// Lowercase `0x`-prefixed hex form of an address, used in entity ids.
pub fn address_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

/// Lowercase `0x`-prefixed hex form of a transaction hash.
pub fn hash_hex(hash: &B256) -> String {
    format!("0x{}", hex::encode(hash.as_slice()))
}

/// Parse a `0x`-prefixed (or bare) 20-byte hex address.
pub fn parse_address(s: &str) -> Result<Address, CoreError> {
    let invalid = |reason: String| CoreError::InvalidAddress {
        input: s.to_string(),
        reason,
    };
    let raw = s.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(raw).map_err(|e| invalid(e.to_string()))?;
    if bytes.len() != 20 {
        return Err(invalid(format!("expected 20 bytes, got {}", bytes.len())));
    }
    Ok(Address::from_slice(&bytes))
}
