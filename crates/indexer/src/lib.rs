//! Potluck Indexer
//!
//! Consumes Potluck contract logs in chain order and maintains pot, round, participant,
//! user and platform aggregates incrementally. Each log is applied inside one store
//! transaction: a failed contract snapshot read discards every write for that log.

pub mod config;
pub mod entities;
pub mod handlers;
pub mod keys;
pub mod lifecycle;
pub mod reconcile;
pub mod service;

pub use config::{ActivePotsRelease, AllowRequestCollision, IndexerConfig};
pub use service::{channel, submit, IndexerService, Outcome, SkipReason};

use potluck_core::{PotId, SnapshotError};
use potluck_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("snapshot read for pot {pot} failed: {source}")]
    Snapshot {
        pot: PotId,
        #[source]
        source: SnapshotError,
    },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("event channel closed")]
    ChannelClosed,
}
