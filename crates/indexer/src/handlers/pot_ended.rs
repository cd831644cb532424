use potluck_core::{PotEnded, PotReader, U256};
use potluck_store::{EntityStore, Transaction};
use tracing::{info, warn};

use super::HandlerContext;
use crate::{keys, lifecycle, reconcile, IndexerError};

pub(super) fn handle<S, R>(
    tx: &mut Transaction<'_, S>,
    cx: &HandlerContext<'_, R>,
    event: &PotEnded,
) -> Result<(), IndexerError>
where
    S: EntityStore + ?Sized,
    R: PotReader + ?Sized,
{
    let timestamp = cx.meta.block_timestamp;
    // Only the current round number is taken from the snapshot.
    let snapshot = reconcile::read_snapshot(cx.reader, cx.meta, event.pot_id)?;
    let mut stats = lifecycle::load_stats(tx)?;

    let mut completed = None;
    if let Some(mut pot) = tx.get(&keys::pot(event.pot_id))?.or_warn("PotEnded: pot") {
        pot.current_balance = U256::ZERO;
        if pot.complete(timestamp) {
            completed = Some(pot.clone());
        } else {
            warn!(pot = %event.pot_id, "pot already completed, platform counters unchanged");
        }
        tx.put(&pot)?;
    }

    if let Some(mut round) = tx
        .get(&keys::round(event.pot_id, snapshot.round))?
        .or_warn("PotEnded: current round")
    {
        if round.close(timestamp) {
            tx.put(&round)?;
        }
    }

    stats.stamp(timestamp);
    if let Some(pot) = &completed {
        stats.record_pot_completed();
        lifecycle::release_members(tx, &mut stats, pot, None, cx.config.active_pots_release)?;
    }
    tx.put(&stats)?;

    info!(pot = %event.pot_id, round = %snapshot.round, transitioned = completed.is_some(), "pot ended");
    Ok(())
}
