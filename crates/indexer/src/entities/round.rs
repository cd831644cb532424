use potluck_core::{Address, PotId, RoundNumber, Timestamp, U256};
use potluck_store::Entity;
use serde::{Deserialize, Serialize};

use crate::keys::{self, RoundKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub pot: PotId,
    pub round_number: RoundNumber,
    pub deadline: U256,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub status: RoundStatus,
    pub participant_count: u64,
    pub total_contributions: U256,
    pub prize_amount: U256,
    pub rollover_amount: U256,
    pub winner: Option<Address>,
}

impl Round {
    pub fn open(pot: PotId, round_number: RoundNumber, deadline: U256, start_time: Timestamp) -> Self {
        Self {
            pot,
            round_number,
            deadline,
            start_time,
            end_time: None,
            status: RoundStatus::Active,
            participant_count: 0,
            total_contributions: U256::ZERO,
            prize_amount: U256::ZERO,
            rollover_amount: U256::ZERO,
            winner: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RoundStatus::Active
    }

    /// Count one more contributor and return their zero-based arrival index.
    pub fn add_contribution(&mut self, amount: U256) -> u64 {
        self.participant_count += 1;
        self.total_contributions = self.total_contributions.saturating_add(amount);
        self.participant_count - 1
    }

    /// Settle the round with a winner. Returns false if it was already completed.
    pub fn settle(&mut self, winner: Address, prize: U256, rollover: U256, timestamp: Timestamp) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = RoundStatus::Completed;
        self.end_time = Some(timestamp);
        self.winner = Some(winner);
        self.prize_amount = prize;
        self.rollover_amount = rollover;
        true
    }

    /// Close the round without a payout (pot ended).
    pub fn close(&mut self, timestamp: Timestamp) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = RoundStatus::Completed;
        self.end_time = Some(timestamp);
        true
    }
}

impl Entity for Round {
    const KIND: &'static str = "Round";
    type Key = RoundKey;

    fn key(&self) -> RoundKey {
        keys::round(self.pot, self.round_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrival_indices() {
        let mut round = Round::open(U256::from(1u64), U256::ZERO, U256::from(10u64), 5);
        assert_eq!(round.add_contribution(U256::from(100u64)), 0);
        assert_eq!(round.add_contribution(U256::from(100u64)), 1);
        assert_eq!(round.add_contribution(U256::from(100u64)), 2);
        assert_eq!(round.participant_count, 3);
        assert_eq!(round.total_contributions, U256::from(300u64));
    }

    #[test]
    fn test_settle_once() {
        let winner = Address::from([0x02; 20]);
        let mut round = Round::open(U256::from(1u64), U256::ZERO, U256::from(10u64), 5);
        assert!(round.settle(winner, U256::from(300u64), U256::ZERO, 50));
        assert_eq!(round.status, RoundStatus::Completed);
        assert_eq!(round.winner, Some(winner));
        assert_eq!(round.end_time, Some(50));

        assert!(!round.settle(Address::ZERO, U256::from(1u64), U256::ZERO, 60));
        assert!(!round.close(70));
        assert_eq!(round.winner, Some(winner));
        assert_eq!(round.end_time, Some(50));
    }

    #[test]
    fn test_close_without_winner() {
        let mut round = Round::open(U256::from(1u64), U256::ZERO, U256::from(10u64), 5);
        assert!(round.close(9));
        assert_eq!(round.winner, None);
        assert_eq!(round.end_time, Some(9));
    }
}
