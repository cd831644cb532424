use potluck_core::{AllowedParticipantAdded, PotAllowRequested, PotReader};
use potluck_store::{EntityStore, Transaction};
use tracing::{debug, info, warn};

use super::HandlerContext;
use crate::config::AllowRequestCollision;
use crate::entities::{AllowRequest, AllowRequestStatus, AllowedUser};
use crate::{keys, lifecycle, reconcile, IndexerError};

pub(super) fn handle_requested<S, R>(
    tx: &mut Transaction<'_, S>,
    cx: &HandlerContext<'_, R>,
    event: &PotAllowRequested,
) -> Result<(), IndexerError>
where
    S: EntityStore + ?Sized,
    R: PotReader + ?Sized,
{
    let timestamp = cx.meta.block_timestamp;
    // The pot must exist on-chain; a failed read drops the request.
    let snapshot = reconcile::read_snapshot(cx.reader, cx.meta, event.pot_id)?;
    if snapshot.is_public {
        debug!(pot = %event.pot_id, requestor = %event.requestor, "allow request for a public pot");
    }
    let mut stats = lifecycle::load_stats(tx)?;

    let key = keys::allow_request(event.pot_id, event.requestor, timestamp);
    let collided = tx.contains(&key)?;
    let write = match (collided, cx.config.allow_request_collision) {
        (false, _) => true,
        (true, AllowRequestCollision::Overwrite) => {
            warn!(pot = %event.pot_id, requestor = %event.requestor, timestamp, "allow request collision, replacing earlier request");
            true
        }
        (true, AllowRequestCollision::KeepFirst) => {
            warn!(pot = %event.pot_id, requestor = %event.requestor, timestamp, "allow request collision, keeping earlier request");
            false
        }
    };
    if write {
        tx.put(&AllowRequest {
            pot: event.pot_id,
            user: event.requestor,
            requested_at: timestamp,
            status: AllowRequestStatus::Pending,
            transaction_hash: cx.meta.transaction_hash,
        })?;
    }

    let requestor = lifecycle::touch_user(tx, &mut stats, event.requestor, timestamp)?;
    tx.put(&requestor)?;

    stats.stamp(timestamp);
    tx.put(&stats)?;

    info!(pot = %event.pot_id, requestor = %event.requestor, "allow requested");
    Ok(())
}

pub(super) fn handle_added<S, R>(
    tx: &mut Transaction<'_, S>,
    cx: &HandlerContext<'_, R>,
    event: &AllowedParticipantAdded,
) -> Result<(), IndexerError>
where
    S: EntityStore + ?Sized,
    R: PotReader + ?Sized,
{
    let timestamp = cx.meta.block_timestamp;
    let mut stats = lifecycle::load_stats(tx)?;

    let key = keys::allowed_user(event.pot_id, event.user);
    if tx.contains(&key)? {
        debug!(pot = %event.pot_id, user = %event.user, "user already allowed");
    } else {
        let added_by = tx
            .get(&keys::pot(event.pot_id))?
            .or_warn("AllowedParticipantAdded: pot")
            .map(|pot| pot.creator);
        tx.put(&AllowedUser {
            pot: event.pot_id,
            user: event.user,
            added_at: timestamp,
            added_by,
        })?;
    }

    let user = lifecycle::touch_user(tx, &mut stats, event.user, timestamp)?;
    tx.put(&user)?;

    stats.stamp(timestamp);
    tx.put(&stats)?;

    info!(pot = %event.pot_id, user = %event.user, "participant allowed");
    Ok(())
}
