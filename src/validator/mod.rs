//! Validator staking, fines and rewards
//!
//! ```text
//! ┌─────────────┐  fine   ┌───────────┐  reward  ┌──────────────┐
//! │ FineEngine  │────────►│ Validator │◄─────────│ RewardSystem │
//! │ (penalties) │         │ (stake,   │          │ (payouts)    │
//! └─────────────┘         │ reputation)│         └──────────────┘
//!                         └───────────┘
//! ```
//!
//! The calculators are stateless; all state lives on the [`Validator`].

mod fine;
mod reward;
mod stake;

pub use fine::{FineEngine, FineReceipt, FineSchedule, ViolationType};
pub use reward::{RewardConfig, RewardReceipt, RewardSystem};
pub use stake::{
    ACTIVE_REPUTATION_FLOOR, FINE_REPUTATION_PENALTY, FineSnapshot, MAX_REPUTATION,
    REWARD_REPUTATION_GAIN, RewardSnapshot, Validator, ValidatorStatus,
};
