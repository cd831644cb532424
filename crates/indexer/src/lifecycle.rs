//! Cross-entity lifecycle rules shared by the handlers: get-or-create for users, rounds
//! and the platform singleton, and the active-pot bookkeeping that keeps
//! `User.activePots` and `PlatformStats.activeUsers` in step.

use potluck_core::{Address, PotId, RoundNumber, Timestamp, U256};
use potluck_store::{EntityStore, Result, Transaction};
use tracing::debug;

use crate::config::ActivePotsRelease;
use crate::entities::{PlatformStats, Pot, Round, User};
use crate::keys::{self, PlatformKey};

/// Load the platform singleton, or start it at zero.
pub fn load_stats<S: EntityStore + ?Sized>(tx: &mut Transaction<'_, S>) -> Result<PlatformStats> {
    Ok(tx.get(&PlatformKey)?.tolerate().unwrap_or_default())
}

/// Load a user (creating it on first reference) and record activity at `timestamp`.
/// Counts the user into `totalUsers` exactly when its first activity is set.
pub fn touch_user<S: EntityStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    stats: &mut PlatformStats,
    address: Address,
    timestamp: Timestamp,
) -> Result<User> {
    let mut user = tx
        .get(&keys::user(address))?
        .tolerate()
        .unwrap_or_else(|| User::new(address));
    if user.touch(timestamp) {
        stats.record_new_user();
        debug!(user = %address, timestamp, "first activity");
    }
    Ok(user)
}

/// Load a round, opening it ACTIVE with zero counters if absent.
/// The flag is true when the round was opened by this call.
pub fn load_or_open_round<S: EntityStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    pot: PotId,
    round: RoundNumber,
    deadline: U256,
    start_time: Timestamp,
) -> Result<(Round, bool)> {
    match tx.get(&keys::round(pot, round))?.tolerate() {
        Some(existing) => Ok((existing, false)),
        None => {
            debug!(pot = %pot, round = %round, "round opened");
            Ok((Round::open(pot, round, deadline, start_time), true))
        }
    }
}

pub fn enter_pot(user: &mut User, stats: &mut PlatformStats) {
    if user.enter_pot() {
        stats.record_user_activated();
    }
}

pub fn leave_pot(user: &mut User, stats: &mut PlatformStats) {
    if user.leave_pot() {
        stats.record_user_deactivated();
    }
}

/// Release `activePots` after `pot` completed, according to `policy`.
///
/// Every user touched here must already have been staged by the caller, since this
/// reloads them from the transaction.
pub fn release_members<S: EntityStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    stats: &mut PlatformStats,
    pot: &Pot,
    winner: Option<Address>,
    policy: ActivePotsRelease,
) -> Result<()> {
    match policy {
        ActivePotsRelease::AllParticipants => {
            for member in &pot.members {
                if let Some(mut participant) = tx
                    .get(&keys::participant(pot.id, *member))?
                    .or_warn("release member participant")
                {
                    participant.is_active = false;
                    tx.put(&participant)?;
                }
                if let Some(mut user) = tx.get(&keys::user(*member))?.or_warn("release member user") {
                    leave_pot(&mut user, stats);
                    tx.put(&user)?;
                }
            }
            debug!(pot = %pot.id, members = pot.members.len(), "members released");
        }
        ActivePotsRelease::WinnerOnly => {
            let Some(winner) = winner else {
                return Ok(());
            };
            // Resolved through the participant record, not the winner address directly.
            let Some(participant) = tx
                .get(&keys::participant(pot.id, winner))?
                .or_warn("release winner participant")
            else {
                return Ok(());
            };
            if let Some(mut user) = tx
                .get(&keys::user(participant.user))?
                .or_warn("release winner user")
            {
                leave_pot(&mut user, stats);
                tx.put(&user)?;
            }
        }
    }
    Ok(())
}
