use potluck_core::{Address, PotId, PotSnapshot, Timestamp, U256};
use potluck_store::Entity;
use serde::{Deserialize, Serialize};

use crate::keys::{self, PotKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PotStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pot {
    pub id: PotId,
    pub name: String,
    pub creator: Address,
    pub token: Address,
    pub entry_amount: U256,
    pub period: U256,
    pub max_participants: U256,
    pub is_public: bool,
    pub status: PotStatus,
    pub current_round: U256,
    pub current_deadline: U256,
    pub current_balance: U256,
    pub total_participants: U256,
    pub total_contributions: U256,
    pub total_payouts: U256,
    pub completed_rounds: u64,
    pub active_participants: u64,
    /// Distinct participants in join order.
    pub members: Vec<Address>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Pot {
    /// A freshly created pot: the creator is its first member and has paid the entry.
    pub fn open(id: PotId, creator: Address, snapshot: &PotSnapshot, timestamp: Timestamp) -> Self {
        Self {
            id,
            name: snapshot.name.clone(),
            creator,
            token: snapshot.token,
            entry_amount: snapshot.entry_amount,
            period: snapshot.period,
            max_participants: snapshot.max_participants,
            is_public: snapshot.is_public,
            status: PotStatus::Active,
            current_round: snapshot.round,
            current_deadline: snapshot.deadline,
            current_balance: snapshot.balance,
            total_participants: snapshot.total_participants,
            total_contributions: snapshot.entry_amount,
            total_payouts: U256::ZERO,
            completed_rounds: 0,
            active_participants: 1,
            members: vec![creator],
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PotStatus::Active
    }

    pub fn is_private(&self) -> bool {
        !self.is_public
    }

    /// Add a distinct member. Returns false if the address was already a member.
    pub fn add_member(&mut self, user: Address) -> bool {
        if self.members.contains(&user) {
            return false;
        }
        self.members.push(user);
        self.active_participants += 1;
        true
    }

    pub fn record_contribution(&mut self, amount: U256, timestamp: Timestamp) {
        self.total_contributions = self.total_contributions.saturating_add(amount);
        self.updated_at = timestamp;
    }

    pub fn record_payout(&mut self, amount: U256, timestamp: Timestamp) {
        self.total_payouts = self.total_payouts.saturating_add(amount);
        self.completed_rounds += 1;
        self.updated_at = timestamp;
    }

    /// ACTIVE -> COMPLETED. Returns true only on the transition itself.
    pub fn complete(&mut self, timestamp: Timestamp) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = PotStatus::Completed;
        self.active_participants = 0;
        self.updated_at = timestamp;
        true
    }
}

impl Entity for Pot {
    const KIND: &'static str = "Pot";
    type Key = PotKey;

    fn key(&self) -> PotKey {
        keys::pot(self.id)
    }
}
