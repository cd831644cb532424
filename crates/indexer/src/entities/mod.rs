//! Persisted entities and their field-level lifecycle rules.
//!
//! Each entity knows how to open itself on first reference and how its counters move;
//! cross-entity orchestration lives in the handlers.

mod allow;
mod contribution;
mod participant;
mod payout;
mod platform;
mod pot;
mod record;
mod round;
mod user;

pub use allow::{AllowRequest, AllowRequestStatus, AllowedUser};
pub use contribution::Contribution;
pub use participant::Participant;
pub use payout::Payout;
pub use platform::PlatformStats;
pub use pot::{Pot, PotStatus};
pub use record::{Checkpoint, ContractOwner, EventRecord};
pub use round::{Round, RoundStatus};
pub use user::User;
