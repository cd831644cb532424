use potluck_core::{Timestamp, U256};
use potluck_store::Entity;
use serde::{Deserialize, Serialize};

use crate::keys::PlatformKey;

/// Platform-wide totals. Singleton, created on the first event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_pots: u64,
    pub active_pots: u64,
    pub completed_pots: u64,
    /// Distinct addresses ever referenced.
    pub total_users: u64,
    /// Users currently in at least one active pot.
    pub active_users: u64,
    pub total_volume: U256,
    /// No event carries fee data; stays zero.
    pub total_fees_paid: U256,
    pub last_updated: Timestamp,
}

impl PlatformStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stamp(&mut self, timestamp: Timestamp) {
        self.last_updated = self.last_updated.max(timestamp);
    }

    pub fn record_new_user(&mut self) {
        self.total_users += 1;
    }

    pub fn record_pot_opened(&mut self) {
        self.total_pots += 1;
        self.active_pots += 1;
    }

    pub fn record_volume(&mut self, amount: U256) {
        self.total_volume = self.total_volume.saturating_add(amount);
    }

    pub fn record_pot_completed(&mut self) {
        self.completed_pots += 1;
        self.active_pots = self.active_pots.saturating_sub(1);
    }

    pub fn record_user_activated(&mut self) {
        self.active_users += 1;
    }

    pub fn record_user_deactivated(&mut self) {
        self.active_users = self.active_users.saturating_sub(1);
    }
}

impl Entity for PlatformStats {
    const KIND: &'static str = "PlatformStats";
    type Key = PlatformKey;

    fn key(&self) -> PlatformKey {
        PlatformKey
    }
}
