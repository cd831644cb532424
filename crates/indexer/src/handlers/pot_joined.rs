use potluck_core::{PotJoined, PotReader};
use potluck_store::{EntityStore, Transaction};
use tracing::{info, warn};

use super::HandlerContext;
use crate::entities::{Contribution, Participant};
use crate::{keys, lifecycle, reconcile, IndexerError};

pub(super) fn handle<S, R>(
    tx: &mut Transaction<'_, S>,
    cx: &HandlerContext<'_, R>,
    event: &PotJoined,
) -> Result<(), IndexerError>
where
    S: EntityStore + ?Sized,
    R: PotReader + ?Sized,
{
    let timestamp = cx.meta.block_timestamp;
    let snapshot = reconcile::read_snapshot(cx.reader, cx.meta, event.pot_id)?;
    let entry = snapshot.entry_amount;
    let mut stats = lifecycle::load_stats(tx)?;

    // First-time membership is decided before anything is written.
    let existing = tx.get(&keys::participant(event.pot_id, event.user))?.tolerate();
    let first_join = existing.is_none();

    let pot = tx.get(&keys::pot(event.pot_id))?.or_warn("PotJoined: pot");
    let pot_indexed = pot.is_some();
    if let Some(mut pot) = pot {
        reconcile::reconcile_join(&mut pot, &snapshot);
        pot.record_contribution(entry, timestamp);
        if first_join {
            pot.add_member(event.user);
        }
        tx.put(&pot)?;
    }

    let mut user = lifecycle::touch_user(tx, &mut stats, event.user, timestamp)?;
    user.total_contributed = user.total_contributed.saturating_add(entry);

    let (mut round, _) = lifecycle::load_or_open_round(
        tx,
        event.pot_id,
        event.round_id,
        snapshot.deadline,
        timestamp,
    )?;

    let participant = match existing {
        Some(mut participant) => {
            participant.contribute(event.round_id, entry);
            participant
        }
        None => {
            // Without a pot record the user is not a member, so no completion could
            // ever release an active pot counted here.
            if pot_indexed {
                lifecycle::enter_pot(&mut user, &mut stats);
            } else {
                warn!(pot = %event.pot_id, user = %event.user, "pot not indexed, active pots left unchanged");
            }
            Participant::join(event.pot_id, event.user, event.round_id, entry, timestamp)
        }
    };
    tx.put(&participant)?;
    tx.put(&user)?;

    let participant_index = round.add_contribution(entry);
    tx.put(&round)?;

    let contribution_key = keys::contribution(event.pot_id, event.round_id, event.user);
    if tx.contains(&contribution_key)? {
        warn!(
            pot = %event.pot_id,
            round = %event.round_id,
            user = %event.user,
            "contribution already recorded for this round, keeping the first"
        );
    } else {
        tx.put(&Contribution {
            pot: event.pot_id,
            round: event.round_id,
            user: event.user,
            amount: entry,
            timestamp,
            transaction_hash: cx.meta.transaction_hash,
            participant_index,
        })?;
    }

    stats.record_volume(entry);
    stats.stamp(timestamp);
    tx.put(&stats)?;

    info!(
        pot = %event.pot_id,
        round = %event.round_id,
        user = %event.user,
        participant_index,
        first_join,
        "pot joined"
    );
    Ok(())
}
