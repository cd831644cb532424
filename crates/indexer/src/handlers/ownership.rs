use potluck_core::{OwnershipTransferred, PotReader};
use potluck_store::{EntityStore, Transaction};
use tracing::info;

use super::HandlerContext;
use crate::entities::ContractOwner;
use crate::IndexerError;

pub(super) fn handle<S, R>(
    tx: &mut Transaction<'_, S>,
    cx: &HandlerContext<'_, R>,
    event: &OwnershipTransferred,
) -> Result<(), IndexerError>
where
    S: EntityStore + ?Sized,
    R: PotReader + ?Sized,
{
    tx.put(&ContractOwner {
        owner: event.new_owner,
        previous_owner: event.previous_owner,
        updated_at: cx.meta.block_timestamp,
        transaction_hash: cx.meta.transaction_hash,
    })?;
    info!(previous = %event.previous_owner, owner = %event.new_owner, "contract ownership transferred");
    Ok(())
}
