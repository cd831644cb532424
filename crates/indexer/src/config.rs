//! Indexer configuration, persisted through `potluck-settings`.

use std::path::PathBuf;

use potluck_core::Address;
use serde::{Deserialize, Serialize};

/// Whose `activePots` counter is released when a pot completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivePotsRelease {
    /// Every member of the pot; their participants are marked inactive too.
    #[default]
    AllParticipants,
    /// Only the winner of the final payout.
    WinnerOnly,
}

/// What to do when an allow request lands on an existing `pot-user-timestamp` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowRequestCollision {
    /// Replace the earlier request with the later one.
    #[default]
    Overwrite,
    /// Keep the earlier request, drop the later one.
    KeepFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Only logs from this contract are applied. `None` accepts any emitter.
    pub contract: Option<Address>,
    /// SQLite file for the entity store. `None` keeps entities in memory.
    pub database_path: Option<PathBuf>,
    /// Capacity of the inbound event channel.
    pub channel_capacity: usize,
    pub active_pots_release: ActivePotsRelease,
    pub allow_request_collision: AllowRequestCollision,
    /// Keep an immutable `EventRecord` per handled log.
    pub record_raw_events: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            contract: None,
            database_path: None,
            channel_capacity: 1024,
            active_pots_release: ActivePotsRelease::default(),
            allow_request_collision: AllowRequestCollision::default(),
            record_raw_events: true,
        }
    }
}
