//! End-to-end pipeline against the SQLite backend and the channel loop.

use potluck_core::{
    Address, EventMeta, IndexedEvent, MemoryPotReader, PotCreated, PotJoined, PotPayout,
    PotSnapshot, PotluckEvent, B256, U256,
};
use potluck_indexer::entities::{PotStatus, RoundStatus};
use potluck_indexer::{channel, keys, submit, IndexerConfig, IndexerService};
use potluck_store::{EntityStore, SqliteStore};

fn addr(last: u8) -> Address {
    let mut bytes = [0x11u8; 20];
    bytes[19] = last;
    Address::from(bytes)
}

fn snapshot(balance: u64) -> PotSnapshot {
    PotSnapshot {
        name: "sqlite pot".to_string(),
        token: addr(0xEE),
        entry_amount: U256::from(250u64),
        period: U256::from(3600u64),
        max_participants: U256::from(4u64),
        is_public: true,
        round: U256::ZERO,
        deadline: U256::from(1_700_003_600u64),
        balance: U256::from(balance),
        total_participants: U256::from(1u64),
    }
}

fn indexed(block: u64, event: PotluckEvent) -> IndexedEvent {
    let mut hash = [0u8; 32];
    hash[24..].copy_from_slice(&block.to_be_bytes());
    IndexedEvent::new(
        EventMeta {
            contract: addr(0xCC),
            block_number: block,
            block_timestamp: 1_700_000_000 + block,
            transaction_hash: B256::from(hash),
            log_index: 0,
        },
        event,
    )
}

fn pot_id() -> U256 {
    U256::from(3u64)
}

#[test]
fn test_scenarios_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("potluck.db");
    let reader = MemoryPotReader::new();
    reader.set(pot_id(), snapshot(250));

    {
        let store = SqliteStore::open(&path).unwrap();
        let mut service = IndexerService::new(IndexerConfig::default(), store, reader.clone());
        service
            .process(&indexed(
                10,
                PotluckEvent::PotCreated(PotCreated {
                    pot_id: pot_id(),
                    creator: addr(1),
                }),
            ))
            .unwrap();
        reader.update(pot_id(), |s| s.balance = U256::from(500u64));
        service
            .process(&indexed(
                11,
                PotluckEvent::PotJoined(PotJoined {
                    pot_id: pot_id(),
                    round_id: U256::ZERO,
                    user: addr(2),
                }),
            ))
            .unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let mut service = IndexerService::new(IndexerConfig::default(), store, reader.clone());

    // restart replays from before the checkpoint; the join must not apply twice
    service
        .process(&indexed(
            11,
            PotluckEvent::PotJoined(PotJoined {
                pot_id: pot_id(),
                round_id: U256::ZERO,
                user: addr(2),
            }),
        ))
        .unwrap();
    let round = service.get(&keys::round(pot_id(), U256::ZERO)).unwrap().unwrap();
    assert_eq!(round.participant_count, 2);

    reader.update(pot_id(), |s| s.balance = U256::ZERO);
    service
        .process(&indexed(
            12,
            PotluckEvent::PotPayout(PotPayout {
                pot_id: pot_id(),
                winner: addr(2),
                amount: U256::from(500u64),
                round: U256::ZERO,
            }),
        ))
        .unwrap();

    let pot = service.get(&keys::pot(pot_id())).unwrap().unwrap();
    assert_eq!(pot.status, PotStatus::Completed);
    let round = service.get(&keys::round(pot_id(), U256::ZERO)).unwrap().unwrap();
    assert_eq!(round.status, RoundStatus::Completed);
    assert_eq!(round.winner, Some(addr(2)));

    let stats = service.stats().unwrap();
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.completed_pots, 1);
    assert_eq!(stats.active_pots, 0);
    assert_eq!(stats.total_volume, U256::from(500u64));

    assert_eq!(service.checkpoint().unwrap().unwrap().events_processed, 3);
    assert_eq!(service.store().count("EventRecord").unwrap(), 3);
}

#[tokio::test]
async fn test_channel_loop_over_sqlite() {
    let config = IndexerConfig {
        contract: Some(addr(0xCC)),
        ..IndexerConfig::default()
    };
    let reader = MemoryPotReader::new();
    reader.set(pot_id(), snapshot(250));

    let (sender, receiver) = channel(&config);
    let mut service = IndexerService::new(config, SqliteStore::open_in_memory().unwrap(), reader);

    let producer = tokio::spawn(async move {
        submit(
            &sender,
            indexed(
                1,
                PotluckEvent::PotCreated(PotCreated {
                    pot_id: pot_id(),
                    creator: addr(1),
                }),
            ),
        )
        .await?;
        let mut foreign = indexed(
            2,
            PotluckEvent::PotJoined(PotJoined {
                pot_id: pot_id(),
                round_id: U256::ZERO,
                user: addr(9),
            }),
        );
        foreign.meta.contract = addr(0xDD);
        submit(&sender, foreign).await
    });

    let applied = service.run(receiver).await.unwrap();
    producer.await.unwrap().unwrap();

    assert_eq!(applied, 1);
    assert!(service.get(&keys::pot(pot_id())).unwrap().is_some());
    assert!(service.get(&keys::user(addr(9))).unwrap().is_none());
}

#[tokio::test]
async fn test_fatal_error_stops_the_loop() {
    let config = IndexerConfig::default();
    let (sender, receiver) = channel(&config);
    let mut service = IndexerService::new(
        config,
        SqliteStore::open_in_memory().unwrap(),
        MemoryPotReader::new(),
    );

    submit(
        &sender,
        indexed(
            1,
            PotluckEvent::PotCreated(PotCreated {
                pot_id: pot_id(),
                creator: addr(1),
            }),
        ),
    )
    .await
    .unwrap();

    assert!(service.run(receiver).await.is_err());
    assert!(service.checkpoint().unwrap().is_none());
    assert_eq!(service.store().count("Pot").unwrap(), 0);
}
