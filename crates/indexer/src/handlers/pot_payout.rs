use potluck_core::{PotPayout, PotReader};
use potluck_store::{EntityStore, Transaction};
use tracing::{debug, info, warn};

use super::HandlerContext;
use crate::entities::Payout;
use crate::{keys, lifecycle, reconcile, IndexerError};

pub(super) fn handle<S, R>(
    tx: &mut Transaction<'_, S>,
    cx: &HandlerContext<'_, R>,
    event: &PotPayout,
) -> Result<(), IndexerError>
where
    S: EntityStore + ?Sized,
    R: PotReader + ?Sized,
{
    let timestamp = cx.meta.block_timestamp;
    let snapshot = reconcile::read_snapshot(cx.reader, cx.meta, event.pot_id)?;
    let drained = reconcile::is_drained(&snapshot);
    let mut stats = lifecycle::load_stats(tx)?;

    let mut completed = None;
    let mut still_active = false;
    if let Some(mut pot) = tx.get(&keys::pot(event.pot_id))?.or_warn("PotPayout: pot") {
        reconcile::reconcile_payout(&mut pot, &snapshot);
        pot.record_payout(event.amount, timestamp);
        if drained && pot.complete(timestamp) {
            completed = Some(pot.clone());
        }
        still_active = pot.is_active();
        tx.put(&pot)?;
    }

    let payout_key = keys::payout(event.pot_id, event.round);
    if tx.contains(&payout_key)? {
        warn!(pot = %event.pot_id, round = %event.round, "payout already recorded for this round, keeping the first");
    } else {
        tx.put(&Payout {
            pot: event.pot_id,
            round: event.round,
            winner: event.winner,
            amount: event.amount,
            timestamp,
            transaction_hash: cx.meta.transaction_hash,
        })?;
    }

    let mut winner = lifecycle::touch_user(tx, &mut stats, event.winner, timestamp)?;
    winner.total_won = winner.total_won.saturating_add(event.amount);
    tx.put(&winner)?;

    if let Some(mut participant) = tx
        .get(&keys::participant(event.pot_id, event.winner))?
        .or_warn("PotPayout: winning participant")
    {
        participant.record_win(event.amount, timestamp);
        tx.put(&participant)?;
    }

    if let Some(mut round) = tx
        .get(&keys::round(event.pot_id, event.round))?
        .or_warn("PotPayout: settled round")
    {
        if !round.settle(event.winner, event.amount, snapshot.balance, timestamp) {
            warn!(pot = %event.pot_id, round = %event.round, "round already completed, settlement ignored");
        }
        tx.put(&round)?;
    }

    if still_active {
        if let Some(carried) = reconcile::rollover(&snapshot) {
            let (mut next, opened) = lifecycle::load_or_open_round(
                tx,
                event.pot_id,
                snapshot.round,
                snapshot.deadline,
                timestamp,
            )?;
            if opened {
                next.total_contributions = carried;
                next.participant_count = 1;
                tx.put(&next)?;
                debug!(pot = %event.pot_id, round = %snapshot.round, rollover = %carried, "next round opened");
            }
        }
    }

    stats.stamp(timestamp);
    if let Some(pot) = &completed {
        stats.record_pot_completed();
        lifecycle::release_members(tx, &mut stats, pot, Some(event.winner), cx.config.active_pots_release)?;
    }
    tx.put(&stats)?;

    info!(
        pot = %event.pot_id,
        round = %event.round,
        winner = %event.winner,
        amount = %event.amount,
        completed = completed.is_some(),
        "pot payout"
    );
    Ok(())
}
