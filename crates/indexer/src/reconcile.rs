//! Contract snapshot reconciliation.
//!
//! Events carry only identifiers; balances, round numbers and deadlines are copied from
//! the contract's current view of the pot rather than recomputed from the event stream.

use potluck_core::{EventMeta, PotId, PotReader, PotSnapshot, U256};
use tracing::{debug, error};

use crate::entities::Pot;
use crate::IndexerError;

/// Read the snapshot for `pot_id` from the emitting contract. A failed read is fatal for
/// the event being processed.
pub fn read_snapshot<R: PotReader + ?Sized>(
    reader: &R,
    meta: &EventMeta,
    pot_id: PotId,
) -> Result<PotSnapshot, IndexerError> {
    match reader.get_pot(meta.contract, pot_id) {
        Ok(snapshot) => Ok(snapshot),
        Err(source) => {
            error!(
                pot = %pot_id,
                block = meta.block_number,
                log_index = meta.log_index,
                error = %source,
                "snapshot read failed"
            );
            Err(IndexerError::Snapshot {
                pot: pot_id,
                source,
            })
        }
    }
}

/// Copy the fields a join moves on-chain.
pub fn reconcile_join(pot: &mut Pot, snapshot: &PotSnapshot) {
    pot.current_balance = snapshot.balance;
    pot.current_round = snapshot.round;
    pot.current_deadline = snapshot.deadline;
    pot.total_participants = snapshot.total_participants;
    debug!(pot = %pot.id, balance = %snapshot.balance, round = %snapshot.round, "pot reconciled after join");
}

/// Copy the fields a payout moves on-chain.
pub fn reconcile_payout(pot: &mut Pot, snapshot: &PotSnapshot) {
    pot.current_balance = snapshot.balance;
    pot.current_round = snapshot.round;
    debug!(pot = %pot.id, balance = %snapshot.balance, round = %snapshot.round, "pot reconciled after payout");
}

/// A pot whose balance is zero after a payout has paid out for the last time.
pub fn is_drained(snapshot: &PotSnapshot) -> bool {
    snapshot.balance.is_zero()
}

/// Balance carried into the next round after a payout, if any.
pub fn rollover(snapshot: &PotSnapshot) -> Option<U256> {
    if is_drained(snapshot) {
        None
    } else {
        Some(snapshot.balance)
    }
}
