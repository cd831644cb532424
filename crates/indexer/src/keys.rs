//! Entity key derivation.
//!
//! Every id is a pure function of event fields: pot ids and round numbers in decimal,
//! addresses and hashes as lowercase `0x` hex, components joined with `-`.

use potluck_core::{address_hex, hash_hex, Address, PotId, RoundNumber, Timestamp, B256};
use potluck_store::EntityKey;

use crate::entities::{
    AllowRequest, AllowedUser, Checkpoint, Contribution, ContractOwner, EventRecord,
    Participant, Payout, PlatformStats, Pot, Round, User,
};

pub const PLATFORM_ID: &str = "platform";
pub const CHECKPOINT_ID: &str = "cursor";
pub const OWNER_ID: &str = "owner";

fn join(parts: &[String]) -> String {
    parts.join("-")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PotKey(pub PotId);

impl EntityKey for PotKey {
    type Entity = Pot;

    fn id(&self) -> String {
        self.0.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundKey {
    pub pot: PotId,
    pub round: RoundNumber,
}

impl EntityKey for RoundKey {
    type Entity = Round;

    fn id(&self) -> String {
        join(&[self.pot.to_string(), self.round.to_string()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantKey {
    pub pot: PotId,
    pub user: Address,
}

impl EntityKey for ParticipantKey {
    type Entity = Participant;

    fn id(&self) -> String {
        join(&[self.pot.to_string(), address_hex(&self.user)])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserKey(pub Address);

impl EntityKey for UserKey {
    type Entity = User;

    fn id(&self) -> String {
        address_hex(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContributionKey {
    pub pot: PotId,
    pub round: RoundNumber,
    pub user: Address,
}

impl EntityKey for ContributionKey {
    type Entity = Contribution;

    fn id(&self) -> String {
        join(&[
            self.pot.to_string(),
            self.round.to_string(),
            address_hex(&self.user),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutKey {
    pub pot: PotId,
    pub round: RoundNumber,
}

impl EntityKey for PayoutKey {
    type Entity = Payout;

    fn id(&self) -> String {
        join(&[self.pot.to_string(), self.round.to_string()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedUserKey {
    pub pot: PotId,
    pub user: Address,
}

impl EntityKey for AllowedUserKey {
    type Entity = AllowedUser;

    fn id(&self) -> String {
        join(&[self.pot.to_string(), address_hex(&self.user)])
    }
}

/// Second-granularity: two requests by one user for one pot in the same block collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowRequestKey {
    pub pot: PotId,
    pub user: Address,
    pub timestamp: Timestamp,
}

impl EntityKey for AllowRequestKey {
    type Entity = AllowRequest;

    fn id(&self) -> String {
        join(&[
            self.pot.to_string(),
            address_hex(&self.user),
            self.timestamp.to_string(),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformKey;

impl EntityKey for PlatformKey {
    type Entity = PlatformStats;

    fn id(&self) -> String {
        PLATFORM_ID.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecordKey {
    pub transaction_hash: B256,
    pub log_index: u64,
}

impl EntityKey for EventRecordKey {
    type Entity = EventRecord;

    fn id(&self) -> String {
        join(&[hash_hex(&self.transaction_hash), self.log_index.to_string()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointKey;

impl EntityKey for CheckpointKey {
    type Entity = Checkpoint;

    fn id(&self) -> String {
        CHECKPOINT_ID.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerKey;

impl EntityKey for OwnerKey {
    type Entity = ContractOwner;

    fn id(&self) -> String {
        OWNER_ID.to_string()
    }
}

pub fn pot(pot: PotId) -> PotKey {
    PotKey(pot)
}

pub fn round(pot: PotId, round: RoundNumber) -> RoundKey {
    RoundKey { pot, round }
}

pub fn participant(pot: PotId, user: Address) -> ParticipantKey {
    ParticipantKey { pot, user }
}

pub fn user(address: Address) -> UserKey {
    UserKey(address)
}

pub fn contribution(pot: PotId, round: RoundNumber, user: Address) -> ContributionKey {
    ContributionKey { pot, round, user }
}

pub fn payout(pot: PotId, round: RoundNumber) -> PayoutKey {
    PayoutKey { pot, round }
}

pub fn allowed_user(pot: PotId, user: Address) -> AllowedUserKey {
    AllowedUserKey { pot, user }
}

pub fn allow_request(pot: PotId, user: Address, timestamp: Timestamp) -> AllowRequestKey {
    AllowRequestKey {
        pot,
        user,
        timestamp,
    }
}

pub fn event_record(transaction_hash: B256, log_index: u64) -> EventRecordKey {
    EventRecordKey {
        transaction_hash,
        log_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use potluck_core::U256;

    fn addr(last: u8) -> Address {
        let mut bytes = [0xAA; 20];
        bytes[19] = last;
        Address::from(bytes)
    }

    #[test]
    fn test_composite_ids() {
        let pot_id = U256::from(12u64);
        let user = addr(1);
        let user_hex = format!("0x{}01", "aa".repeat(19));

        assert_eq!(pot(pot_id).id(), "12");
        assert_eq!(round(pot_id, U256::from(3u64)).id(), "12-3");
        assert_eq!(participant(pot_id, user).id(), format!("12-{user_hex}"));
        assert_eq!(user_key_id(user), user_hex);
        assert_eq!(
            contribution(pot_id, U256::from(3u64), user).id(),
            format!("12-3-{user_hex}")
        );
        assert_eq!(payout(pot_id, U256::from(3u64)).id(), "12-3");
        assert_eq!(allowed_user(pot_id, user).id(), format!("12-{user_hex}"));
        assert_eq!(
            allow_request(pot_id, user, 1_700_000_000).id(),
            format!("12-{user_hex}-1700000000")
        );
        assert_eq!(PlatformKey.id(), "platform");
    }

    fn user_key_id(address: Address) -> String {
        super::user(address).id()
    }

    #[test]
    fn test_ids_are_deterministic_and_distinct() {
        let a = participant(U256::from(1u64), addr(1)).id();
        let b = participant(U256::from(1u64), addr(1)).id();
        let c = participant(U256::from(1u64), addr(2)).id();
        let d = participant(U256::from(11u64), addr(1)).id();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);

        // decimal pot ids never collide with the round component
        assert_ne!(
            round(U256::from(1u64), U256::from(12u64)).id(),
            round(U256::from(11u64), U256::from(2u64)).id()
        );
    }

    #[test]
    fn test_event_record_id() {
        let key = event_record(B256::from([0xAB; 32]), 7);
        assert_eq!(key.id(), format!("0x{}-7", "ab".repeat(32)));
    }
}
