//! Event-driven indexer service.

use potluck_core::{Address, EventCursor, IndexedEvent, PotReader};
use potluck_store::{EntityKey, EntityStore, Transaction};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::IndexerConfig;
use crate::entities::{Checkpoint, PlatformStats};
use crate::handlers::{self, HandlerContext};
use crate::keys::{CheckpointKey, PlatformKey};
use crate::IndexerError;

/// What `process` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Handlers ran and the transaction committed this many records.
    Applied { writes: usize },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// At or before the committed checkpoint.
    AlreadyProcessed(EventCursor),
    /// Emitted by a contract other than the configured one.
    ForeignContract(Address),
}

/// Owns the entity store and the snapshot reader, and applies events one at a time in
/// delivery order.
pub struct IndexerService<S: EntityStore, R: PotReader> {
    config: IndexerConfig,
    store: S,
    reader: R,
}

impl<S: EntityStore, R: PotReader> IndexerService<S, R> {
    pub fn new(config: IndexerConfig, store: S, reader: R) -> Self {
        Self {
            config,
            store,
            reader,
        }
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Read a committed entity.
    pub fn get<K: EntityKey>(&self, key: &K) -> Result<Option<K::Entity>, IndexerError> {
        Ok(potluck_store::get(&self.store, key)?)
    }

    pub fn checkpoint(&self) -> Result<Option<Checkpoint>, IndexerError> {
        self.get(&CheckpointKey)
    }

    /// Platform counters, zero before the first pot.
    pub fn stats(&self) -> Result<PlatformStats, IndexerError> {
        Ok(self.get(&PlatformKey)?.unwrap_or_default())
    }

    /// Apply one event atomically.
    ///
    /// On error nothing is written and the checkpoint stays where it was, so the same
    /// event can be submitted again.
    pub fn process(&mut self, indexed: &IndexedEvent) -> Result<Outcome, IndexerError> {
        let meta = &indexed.meta;
        let cursor = meta.cursor();

        if let Some(contract) = self.config.contract {
            if meta.contract != contract {
                debug!(contract = %meta.contract, block = meta.block_number, "foreign contract, skipping");
                return Ok(Outcome::Skipped(SkipReason::ForeignContract(meta.contract)));
            }
        }

        let mut tx = Transaction::new(&mut self.store);
        let mut checkpoint = match tx.get(&CheckpointKey)?.tolerate() {
            Some(checkpoint) if cursor <= checkpoint.cursor => {
                debug!(
                    event = indexed.event.name(),
                    cursor = %cursor,
                    checkpoint = %checkpoint.cursor,
                    "already processed, skipping"
                );
                return Ok(Outcome::Skipped(SkipReason::AlreadyProcessed(cursor)));
            }
            Some(checkpoint) => checkpoint,
            None => Checkpoint::default(),
        };

        let cx = HandlerContext {
            reader: &self.reader,
            config: &self.config,
            meta,
        };
        if let Err(e) = handlers::apply(&mut tx, &cx, &indexed.event) {
            error!(
                event = indexed.event.name(),
                block = meta.block_number,
                log_index = meta.log_index,
                error = %e,
                "event failed, transaction discarded"
            );
            return Err(e);
        }

        checkpoint.advance(cursor);
        tx.put(&checkpoint)?;
        let writes = tx.commit()?;

        info!(
            event = indexed.event.name(),
            block = meta.block_number,
            log_index = meta.log_index,
            writes,
            "event indexed"
        );
        Ok(Outcome::Applied { writes })
    }

    /// Drain `events` until every sender is dropped. Returns the number of events applied,
    /// or the first fatal error.
    pub async fn run(&mut self, mut events: mpsc::Receiver<IndexedEvent>) -> Result<u64, IndexerError> {
        info!(contract = ?self.config.contract, "indexer service starting");

        let mut applied = 0u64;
        while let Some(indexed) = events.recv().await {
            if let Outcome::Applied { .. } = self.process(&indexed)? {
                applied += 1;
            }
        }

        info!(applied, "event channel closed, indexer service stopping");
        Ok(applied)
    }
}

/// Bounded event channel sized from the config.
pub fn channel(config: &IndexerConfig) -> (mpsc::Sender<IndexedEvent>, mpsc::Receiver<IndexedEvent>) {
    mpsc::channel(config.channel_capacity.max(1))
}

/// Hand an event to a running service.
pub async fn submit(sender: &mpsc::Sender<IndexedEvent>, event: IndexedEvent) -> Result<(), IndexerError> {
    sender.send(event).await.map_err(|_| IndexerError::ChannelClosed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use potluck_core::{
        EventMeta, MemoryPotReader, OwnershipTransferred, PotEnded, PotluckEvent, B256, U256,
    };
    use potluck_store::MemoryStore;

    fn ownership(block: u64, log_index: u64, contract: Address) -> IndexedEvent {
        IndexedEvent::new(
            EventMeta {
                contract,
                block_number: block,
                block_timestamp: 1_000 + block,
                transaction_hash: B256::from([block as u8; 32]),
                log_index,
            },
            PotluckEvent::OwnershipTransferred(OwnershipTransferred {
                previous_owner: Address::ZERO,
                new_owner: Address::from([0x0F; 20]),
            }),
        )
    }

    fn service(config: IndexerConfig) -> IndexerService<MemoryStore, MemoryPotReader> {
        IndexerService::new(config, MemoryStore::new(), MemoryPotReader::new())
    }

    #[test]
    fn test_checkpoint_advances() {
        let mut service = service(IndexerConfig::default());
        let outcome = service.process(&ownership(5, 2, Address::ZERO)).unwrap();
        assert!(matches!(outcome, Outcome::Applied { writes } if writes > 0));

        let checkpoint = service.checkpoint().unwrap().unwrap();
        assert_eq!(checkpoint.cursor, EventCursor::new(5, 2));
        assert_eq!(checkpoint.events_processed, 1);
    }

    #[test]
    fn test_replayed_event_is_skipped() {
        let mut service = service(IndexerConfig::default());
        service.process(&ownership(5, 2, Address::ZERO)).unwrap();

        let outcome = service.process(&ownership(5, 2, Address::ZERO)).unwrap();
        assert_eq!(
            outcome,
            Outcome::Skipped(SkipReason::AlreadyProcessed(EventCursor::new(5, 2)))
        );
        let outcome = service.process(&ownership(4, 9, Address::ZERO)).unwrap();
        assert!(matches!(outcome, Outcome::Skipped(SkipReason::AlreadyProcessed(_))));

        assert!(matches!(
            service.process(&ownership(5, 3, Address::ZERO)).unwrap(),
            Outcome::Applied { .. }
        ));
        assert_eq!(service.checkpoint().unwrap().unwrap().events_processed, 2);
    }

    #[test]
    fn test_foreign_contract_is_skipped() {
        let ours = Address::from([0x01; 20]);
        let theirs = Address::from([0x02; 20]);
        let mut service = service(IndexerConfig {
            contract: Some(ours),
            ..IndexerConfig::default()
        });

        assert_eq!(
            service.process(&ownership(1, 0, theirs)).unwrap(),
            Outcome::Skipped(SkipReason::ForeignContract(theirs))
        );
        assert!(service.store().is_empty());
        assert!(service.process(&ownership(1, 0, ours)).is_ok());
        assert!(!service.store().is_empty());
    }

    #[test]
    fn test_failed_event_keeps_checkpoint() {
        let mut service = service(IndexerConfig::default());
        service.process(&ownership(1, 0, Address::ZERO)).unwrap();

        let mut ended = ownership(2, 0, Address::ZERO);
        ended.event = PotluckEvent::PotEnded(PotEnded {
            pot_id: U256::from(9u64),
        });
        let err = service.process(&ended).unwrap_err();
        assert!(matches!(err, IndexerError::Snapshot { .. }));
        assert_eq!(
            service.checkpoint().unwrap().unwrap().cursor,
            EventCursor::new(1, 0)
        );
    }

    #[test]
    fn test_stats_default_to_zero() {
        let service = service(IndexerConfig::default());
        assert_eq!(service.stats().unwrap(), PlatformStats::default());
    }

    #[tokio::test]
    async fn test_run_drains_channel() {
        let config = IndexerConfig {
            channel_capacity: 4,
            ..IndexerConfig::default()
        };
        let (sender, receiver) = channel(&config);
        let mut service = service(config);

        submit(&sender, ownership(1, 0, Address::ZERO)).await.unwrap();
        submit(&sender, ownership(1, 0, Address::ZERO)).await.unwrap();
        submit(&sender, ownership(2, 0, Address::ZERO)).await.unwrap();
        drop(sender);

        assert_eq!(service.run(receiver).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_submit_to_closed_channel() {
        let (sender, receiver) = channel(&IndexerConfig::default());
        drop(receiver);
        let err = submit(&sender, ownership(1, 0, Address::ZERO)).await.unwrap_err();
        assert!(matches!(err, IndexerError::ChannelClosed));
    }
}
