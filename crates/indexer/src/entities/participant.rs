use potluck_core::{Address, PotId, RoundNumber, Timestamp, U256};
use potluck_store::Entity;
use serde::{Deserialize, Serialize};

use crate::keys::{self, ParticipantKey};

/// Membership of one user in one pot, across all of its rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub pot: PotId,
    pub user: Address,
    pub joined_at: Timestamp,
    pub is_active: bool,
    pub has_won: bool,
    pub won_amount: U256,
    pub won_at: Option<Timestamp>,
    pub total_contributed: U256,
    pub rounds_participated: u64,
    pub last_round_participated: RoundNumber,
}

impl Participant {
    /// First contribution to the pot.
    pub fn join(pot: PotId, user: Address, round: RoundNumber, amount: U256, timestamp: Timestamp) -> Self {
        Self {
            pot,
            user,
            joined_at: timestamp,
            is_active: true,
            has_won: false,
            won_amount: U256::ZERO,
            won_at: None,
            total_contributed: amount,
            rounds_participated: 1,
            last_round_participated: round,
        }
    }

    /// A later round's contribution by an existing member.
    pub fn contribute(&mut self, round: RoundNumber, amount: U256) {
        self.total_contributed = self.total_contributed.saturating_add(amount);
        self.rounds_participated += 1;
        self.last_round_participated = round;
        self.is_active = true;
    }

    pub fn record_win(&mut self, amount: U256, timestamp: Timestamp) {
        self.has_won = true;
        self.won_at = Some(timestamp);
        self.won_amount = self.won_amount.saturating_add(amount);
    }
}

impl Entity for Participant {
    const KIND: &'static str = "Participant";
    type Key = ParticipantKey;

    fn key(&self) -> ParticipantKey {
        keys::participant(self.pot, self.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejoin_accumulates() {
        let user = Address::from([0x03; 20]);
        let mut p = Participant::join(U256::from(1u64), user, U256::ZERO, U256::from(100u64), 10);
        p.is_active = false;
        p.contribute(U256::from(1u64), U256::from(100u64));

        assert!(p.is_active);
        assert_eq!(p.rounds_participated, 2);
        assert_eq!(p.last_round_participated, U256::from(1u64));
        assert_eq!(p.total_contributed, U256::from(200u64));
        assert_eq!(p.joined_at, 10);
    }

    #[test]
    fn test_wins_accumulate() {
        let mut p = Participant::join(U256::from(1u64), Address::ZERO, U256::ZERO, U256::from(100u64), 10);
        p.record_win(U256::from(300u64), 20);
        p.record_win(U256::from(50u64), 30);
        assert!(p.has_won);
        assert_eq!(p.won_amount, U256::from(350u64));
        assert_eq!(p.won_at, Some(30));
    }
}
