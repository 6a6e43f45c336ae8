//! Reward System
//!
//! Rewards grow with reputation (5 to 10 units) plus a volume bonus of 0.1%
//! of the validated amount, capped at 20.

use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::validator::stake::{RewardSnapshot, Validator};

/// Reward calculation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardConfig {
    /// Reward paid regardless of reputation
    pub base_reward: f64,
    /// Reputation points per extra reward unit
    pub reputation_divisor: f64,
    /// Share of the transaction amount paid as volume bonus
    pub volume_rate: f64,
    /// Ceiling on the volume bonus
    pub max_volume_bonus: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            base_reward: 5.0,
            reputation_divisor: 20.0,
            volume_rate: 0.001,
            max_volume_bonus: 20.0,
        }
    }
}

/// Outcome of a reward paid to a validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardReceipt {
    pub validator_id: String,
    pub reward_amount: f64,
    pub details: String,
    pub result: RewardSnapshot,
}

#[derive(Debug, Clone, Default)]
pub struct RewardSystem {
    config: RewardConfig,
}

impl RewardSystem {
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn calculate_reward(&self, reputation: u32, transaction_amount: f64) -> f64 {
        let config = &self.config;
        let mut reward = config.base_reward + reputation as f64 / config.reputation_divisor;

        if transaction_amount > 0.0 {
            reward += (transaction_amount * config.volume_rate).min(config.max_volume_bonus);
        }

        reward
    }

    /// Reward `validator` based on its reputation before the payout
    pub fn award_reward(
        &self,
        validator: &mut Validator,
        transaction_amount: f64,
        details: Option<&str>,
    ) -> Result<RewardReceipt, WalletError> {
        let reward_amount = self.calculate_reward(validator.reputation(), transaction_amount);
        let result = validator.award_reward(reward_amount)?;

        Ok(RewardReceipt {
            validator_id: validator.validator_id().to_string(),
            reward_amount,
            details: details.unwrap_or_default().to_string(),
            result,
        })
    }
}
