//! Validator Stake and Reputation
//!
//! A validator stakes funds and earns reputation by validating transactions.
//! Reputation rises by one point per reward and drops by five per fine,
//! always staying within `0..=100`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{WalletError, ensure_positive};

/// Upper bound for reputation
pub const MAX_REPUTATION: u32 = 100;

/// Reputation gained per reward
pub const REWARD_REPUTATION_GAIN: u32 = 1;

/// Reputation lost per fine
pub const FINE_REPUTATION_PENALTY: u32 = 5;

/// Reputation a validator must exceed to count as active
pub const ACTIVE_REPUTATION_FLOOR: u32 = 20;

/// A single validator's stake, reputation and counters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    validator_id: String,
    reputation: u32,
    locked_amount: f64,
    rewards: f64,
    fines: f64,
    validated_transactions: u64,
    failed_validations: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Read-only view of a validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorStatus {
    pub validator_id: String,
    pub reputation: u32,
    pub locked_amount: f64,
    pub rewards: f64,
    pub fines: f64,
    pub validated_transactions: u64,
    pub failed_validations: u64,
    pub is_active: bool,
}

/// Validator state right after a reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSnapshot {
    pub validator_id: String,
    pub rewards: f64,
    pub reputation: u32,
    pub validated_transactions: u64,
}

/// Validator state right after a fine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FineSnapshot {
    pub validator_id: String,
    pub fines: f64,
    pub reputation: u32,
    pub failed_validations: u64,
    pub reason: String,
}

impl Validator {
    /// New validator at full reputation
    pub fn new(validator_id: impl Into<String>) -> Self {
        Self::with_reputation(validator_id, MAX_REPUTATION)
    }

    /// New validator with an initial reputation, clamped to the valid range
    pub fn with_reputation(validator_id: impl Into<String>, reputation: u32) -> Self {
        let now = Utc::now();
        Self {
            validator_id: validator_id.into(),
            reputation: reputation.min(MAX_REPUTATION),
            locked_amount: 0.0,
            rewards: 0.0,
            fines: 0.0,
            validated_transactions: 0,
            failed_validations: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validator_id(&self) -> &str {
        &self.validator_id
    }

    pub fn reputation(&self) -> u32 {
        self.reputation
    }

    pub fn locked_amount(&self) -> f64 {
        self.locked_amount
    }

    /// `reputation > 20` and some stake locked
    pub fn is_active(&self) -> bool {
        self.reputation > ACTIVE_REPUTATION_FLOOR && self.locked_amount > 0.0
    }

    /// Whether the validator may take on a validation job.
    ///
    /// Looser than [`is_active`](Self::is_active) at the boundary: a
    /// reputation of exactly 20 still qualifies.
    pub fn can_validate(&self) -> bool {
        self.reputation >= ACTIVE_REPUTATION_FLOOR && self.locked_amount > 0.0
    }

    /// Add stake, returning the new locked amount
    pub fn lock_funds(&mut self, amount: f64) -> Result<f64, WalletError> {
        ensure_positive(amount, "lock")?;

        self.locked_amount += amount;
        self.touch();
        Ok(self.locked_amount)
    }

    /// Release stake, returning the new locked amount
    pub fn unlock_funds(&mut self, amount: f64) -> Result<f64, WalletError> {
        ensure_positive(amount, "unlock")?;
        if amount > self.locked_amount {
            return Err(WalletError::ExceedsLockedStake);
        }

        self.locked_amount -= amount;
        self.touch();
        Ok(self.locked_amount)
    }

    pub fn award_reward(&mut self, amount: f64) -> Result<RewardSnapshot, WalletError> {
        ensure_positive(amount, "reward")?;

        self.rewards += amount;
        self.reputation = (self.reputation + REWARD_REPUTATION_GAIN).min(MAX_REPUTATION);
        self.validated_transactions += 1;
        self.touch();

        Ok(RewardSnapshot {
            validator_id: self.validator_id.clone(),
            rewards: self.rewards,
            reputation: self.reputation,
            validated_transactions: self.validated_transactions,
        })
    }

    pub fn apply_fine(
        &mut self,
        amount: f64,
        reason: impl Into<String>,
    ) -> Result<FineSnapshot, WalletError> {
        ensure_positive(amount, "fine")?;

        self.fines += amount;
        self.reputation = self.reputation.saturating_sub(FINE_REPUTATION_PENALTY);
        self.failed_validations += 1;
        self.touch();

        Ok(FineSnapshot {
            validator_id: self.validator_id.clone(),
            fines: self.fines,
            reputation: self.reputation,
            failed_validations: self.failed_validations,
            reason: reason.into(),
        })
    }

    pub fn status(&self) -> ValidatorStatus {
        ValidatorStatus {
            validator_id: self.validator_id.clone(),
            reputation: self.reputation,
            locked_amount: self.locked_amount,
            rewards: self.rewards,
            fines: self.fines,
            validated_transactions: self.validated_transactions,
            failed_validations: self.failed_validations,
            is_active: self.is_active(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validator_defaults() {
        let validator = Validator::new("val_1");
        let status = validator.status();

        assert_eq!(status.reputation, 100);
        assert_eq!(status.locked_amount, 0.0);
        assert!(!status.is_active, "no stake means inactive");
    }

    #[test]
    fn test_initial_reputation_is_clamped() {
        assert_eq!(Validator::with_reputation("v", 250).reputation(), 100);
        assert_eq!(Validator::with_reputation("v", 40).reputation(), 40);
    }

    #[test]
    fn test_lock_and_unlock() {
        let mut validator = Validator::new("val_1");

        assert_eq!(validator.lock_funds(150.0).unwrap(), 150.0);
        assert_eq!(validator.lock_funds(50.0).unwrap(), 200.0);
        assert_eq!(validator.unlock_funds(120.0).unwrap(), 80.0);

        assert_eq!(
            validator.unlock_funds(81.0),
            Err(WalletError::ExceedsLockedStake)
        );
        assert_eq!(validator.locked_amount(), 80.0);
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        let mut validator = Validator::new("val_1");

        assert!(validator.lock_funds(0.0).is_err());
        assert!(validator.unlock_funds(-1.0).is_err());
        assert!(validator.award_reward(0.0).is_err());
        assert!(validator.apply_fine(-3.0, "x").is_err());

        let status = validator.status();
        assert_eq!(status.validated_transactions, 0);
        assert_eq!(status.failed_validations, 0);
    }

    #[test]
    fn test_reward_caps_reputation() {
        let mut validator = Validator::new("val_1");
        let snapshot = validator.award_reward(7.5).unwrap();

        assert_eq!(snapshot.reputation, 100);
        assert_eq!(snapshot.rewards, 7.5);
        assert_eq!(snapshot.validated_transactions, 1);
    }

    #[test]
    fn test_fine_floors_reputation() {
        let mut validator = Validator::with_reputation("val_1", 7);

        let first = validator.apply_fine(75.0, "invalid_validation").unwrap();
        assert_eq!(first.reputation, 2);
        assert_eq!(first.reason, "invalid_validation");

        let second = validator.apply_fine(75.0, "invalid_validation").unwrap();
        assert_eq!(second.reputation, 0);
        assert_eq!(second.fines, 150.0);
        assert_eq!(second.failed_validations, 2);
    }

    #[test]
    fn test_reputation_stays_in_range() {
        let mut validator = Validator::with_reputation("val_1", 60);

        for round in 0..200 {
            if round % 3 == 0 {
                validator.apply_fine(10.0, "delayed_validation").unwrap();
            } else {
                validator.award_reward(5.0).unwrap();
            }
            assert!(validator.reputation() <= MAX_REPUTATION);
        }
    }

    #[test]
    fn test_activity_thresholds() {
        let mut validator = Validator::with_reputation("val_1", 20);
        validator.lock_funds(10.0).unwrap();

        assert!(!validator.is_active());
        assert!(validator.can_validate());

        let mut validator = Validator::with_reputation("val_2", 21);
        validator.lock_funds(10.0).unwrap();
        assert!(validator.is_active());
    }
}
