use potluck_core::{Address, PotId, Timestamp, B256};
use potluck_store::Entity;
use serde::{Deserialize, Serialize};

use crate::keys::{self, AllowRequestKey, AllowedUserKey};

/// An address admitted to a private pot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedUser {
    pub pot: PotId,
    pub user: Address,
    pub added_at: Timestamp,
    /// The pot creator; `None` when the pot was not indexed when the user was added.
    pub added_by: Option<Address>,
}

impl Entity for AllowedUser {
    const KIND: &'static str = "AllowedUser";
    type Key = AllowedUserKey;

    fn key(&self) -> AllowedUserKey {
        keys::allowed_user(self.pot, self.user)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllowRequestStatus {
    Pending,
}

/// Append-only log of requests to join a private pot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowRequest {
    pub pot: PotId,
    pub user: Address,
    pub requested_at: Timestamp,
    pub status: AllowRequestStatus,
    pub transaction_hash: B256,
}

impl Entity for AllowRequest {
    const KIND: &'static str = "AllowRequest";
    type Key = AllowRequestKey;

    fn key(&self) -> AllowRequestKey {
        keys::allow_request(self.pot, self.user, self.requested_at)
    }
}
