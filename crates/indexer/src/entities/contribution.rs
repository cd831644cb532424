use potluck_core::{Address, PotId, RoundNumber, Timestamp, B256, U256};
use potluck_store::Entity;
use serde::{Deserialize, Serialize};

use crate::keys::{self, ContributionKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub pot: PotId,
    pub round: RoundNumber,
    pub user: Address,
    pub amount: U256,
    pub timestamp: Timestamp,
    pub transaction_hash: B256,
    /// Zero-based arrival order within the round.
    pub participant_index: u64,
}

impl Entity for Contribution {
    const KIND: &'static str = "Contribution";
    type Key = ContributionKey;

    fn key(&self) -> ContributionKey {
        keys::contribution(self.pot, self.round, self.user)
    }
}
