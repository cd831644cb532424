use potluck_core::{Address, Timestamp, U256};
use potluck_store::Entity;
use serde::{Deserialize, Serialize};

use crate::keys::{self, UserKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub address: Address,
    pub total_contributed: U256,
    pub total_won: U256,
    /// Distinct pots joined or created.
    pub total_pots: u64,
    pub active_pots: u64,
    /// Unset until the first event that references the user.
    pub first_activity: Option<Timestamp>,
    pub last_activity: Timestamp,
}

impl User {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            total_contributed: U256::ZERO,
            total_won: U256::ZERO,
            total_pots: 0,
            active_pots: 0,
            first_activity: None,
            last_activity: 0,
        }
    }

    /// Record activity at `timestamp`. Returns true if this is the user's first activity.
    pub fn touch(&mut self, timestamp: Timestamp) -> bool {
        let first = self.first_activity.is_none();
        if first {
            self.first_activity = Some(timestamp);
        }
        self.last_activity = self.last_activity.max(timestamp);
        first
    }

    /// Count a newly joined pot. Returns true if the user just became active.
    pub fn enter_pot(&mut self) -> bool {
        self.total_pots += 1;
        self.active_pots += 1;
        self.active_pots == 1
    }

    /// Release one active pot. Returns true if the user just became inactive.
    pub fn leave_pot(&mut self) -> bool {
        if self.active_pots == 0 {
            return false;
        }
        self.active_pots -= 1;
        self.active_pots == 0
    }
}

impl Entity for User {
    const KIND: &'static str = "User";
    type Key = UserKey;

    fn key(&self) -> UserKey {
        keys::user(self.address)
    }
}
