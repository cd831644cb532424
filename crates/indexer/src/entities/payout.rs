use potluck_core::{Address, PotId, RoundNumber, Timestamp, B256, U256};
use potluck_store::Entity;
use serde::{Deserialize, Serialize};

use crate::keys::{self, PayoutKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub pot: PotId,
    pub round: RoundNumber,
    pub winner: Address,
    pub amount: U256,
    pub timestamp: Timestamp,
    pub transaction_hash: B256,
}

impl Entity for Payout {
    const KIND: &'static str = "Payout";
    type Key = PayoutKey;

    fn key(&self) -> PayoutKey {
        keys::payout(self.pot, self.round)
    }
}
