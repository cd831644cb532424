//! One handler per contract event.
//!
//! Handlers stage every write in the caller's transaction; the service commits it once
//! the handler returns `Ok`. Absent entities are handled per branch: `tolerate()` where
//! absence is the normal first-reference case, `or_warn()` where it means an earlier
//! event was never indexed.

mod allow;
mod ownership;
mod pot_created;
mod pot_ended;
mod pot_joined;
mod pot_payout;

use potluck_core::{EventMeta, PotReader, PotluckEvent};
use potluck_store::{EntityStore, Transaction};
use tracing::debug;

use crate::config::IndexerConfig;
use crate::entities::EventRecord;
use crate::IndexerError;

/// Everything a handler needs besides the transaction and the event payload.
pub struct HandlerContext<'a, R: PotReader + ?Sized> {
    pub reader: &'a R,
    pub config: &'a IndexerConfig,
    pub meta: &'a EventMeta,
}

/// Route an event to its handler and, if enabled, record the raw log.
pub fn apply<S, R>(
    tx: &mut Transaction<'_, S>,
    cx: &HandlerContext<'_, R>,
    event: &PotluckEvent,
) -> Result<(), IndexerError>
where
    S: EntityStore + ?Sized,
    R: PotReader + ?Sized,
{
    match event {
        PotluckEvent::PotCreated(e) => pot_created::handle(tx, cx, e)?,
        PotluckEvent::PotJoined(e) => pot_joined::handle(tx, cx, e)?,
        PotluckEvent::PotPayout(e) => pot_payout::handle(tx, cx, e)?,
        PotluckEvent::PotAllowRequested(e) => allow::handle_requested(tx, cx, e)?,
        PotluckEvent::AllowedParticipantAdded(e) => allow::handle_added(tx, cx, e)?,
        PotluckEvent::PotEnded(e) => pot_ended::handle(tx, cx, e)?,
        PotluckEvent::OwnershipTransferred(e) => ownership::handle(tx, cx, e)?,
    }

    if cx.config.record_raw_events {
        record_event(tx, cx.meta, event)?;
    }
    Ok(())
}

fn record_event<S: EntityStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    meta: &EventMeta,
    event: &PotluckEvent,
) -> Result<(), IndexerError> {
    let record = EventRecord {
        name: event.name().to_string(),
        params: event.params(),
        contract: meta.contract,
        block_number: meta.block_number,
        block_timestamp: meta.block_timestamp,
        transaction_hash: meta.transaction_hash,
        log_index: meta.log_index,
    };
    tx.put(&record)?;
    debug!(event = event.name(), log_index = meta.log_index, "raw event recorded");
    Ok(())
}
