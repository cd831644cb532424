use potluck_core::{PotCreated, PotReader};
use potluck_store::{EntityStore, Transaction};
use tracing::{info, warn};

use super::HandlerContext;
use crate::entities::{AllowedUser, Contribution, Participant, Pot};
use crate::{keys, lifecycle, reconcile, IndexerError};

pub(super) fn handle<S, R>(
    tx: &mut Transaction<'_, S>,
    cx: &HandlerContext<'_, R>,
    event: &PotCreated,
) -> Result<(), IndexerError>
where
    S: EntityStore + ?Sized,
    R: PotReader + ?Sized,
{
    let timestamp = cx.meta.block_timestamp;
    let snapshot = reconcile::read_snapshot(cx.reader, cx.meta, event.pot_id)?;
    let entry = snapshot.entry_amount;

    // A pot is created once; a second creation log carries no new information.
    if tx.contains(&keys::pot(event.pot_id))? {
        warn!(pot = %event.pot_id, "pot already indexed, ignoring repeated creation");
        return Ok(());
    }

    let mut stats = lifecycle::load_stats(tx)?;

    let pot = Pot::open(event.pot_id, event.creator, &snapshot, timestamp);
    tx.put(&pot)?;

    let mut creator = lifecycle::touch_user(tx, &mut stats, event.creator, timestamp)?;
    creator.total_contributed = creator.total_contributed.saturating_add(entry);
    lifecycle::enter_pot(&mut creator, &mut stats);
    tx.put(&creator)?;

    let (mut round, _) = lifecycle::load_or_open_round(
        tx,
        event.pot_id,
        snapshot.round,
        snapshot.deadline,
        timestamp,
    )?;
    round.total_contributions = entry;
    round.participant_count = 1;
    tx.put(&round)?;

    let participant_key = keys::participant(event.pot_id, event.creator);
    if !tx.contains(&participant_key)? {
        let participant = Participant::join(event.pot_id, event.creator, snapshot.round, entry, timestamp);
        tx.put(&participant)?;
    }

    let contribution_key = keys::contribution(event.pot_id, snapshot.round, event.creator);
    if !tx.contains(&contribution_key)? {
        tx.put(&Contribution {
            pot: event.pot_id,
            round: snapshot.round,
            user: event.creator,
            amount: entry,
            timestamp,
            transaction_hash: cx.meta.transaction_hash,
            participant_index: 0,
        })?;
    }

    if pot.is_private() && !tx.contains(&keys::allowed_user(event.pot_id, event.creator))? {
        tx.put(&AllowedUser {
            pot: event.pot_id,
            user: event.creator,
            added_at: timestamp,
            added_by: Some(event.creator),
        })?;
    }

    stats.record_pot_opened();
    stats.record_volume(entry);
    stats.stamp(timestamp);
    tx.put(&stats)?;

    info!(
        pot = %event.pot_id,
        creator = %event.creator,
        round = %snapshot.round,
        private = pot.is_private(),
        "pot created"
    );
    Ok(())
}
