//! Wallet Manager - Main Orchestrator
//!
//! Resolves wallets and validators from their repositories, runs the domain
//! operation and stores the result. Mutating operations take `&mut self`, so
//! a caller sharing the manager must serialize them (the HTTP layer holds a
//! write lock for the whole call).
//!
//! A validator id first resolves to the validator owned by the wallet with the
//! same user id, then to a standalone validator that is created on first
//! reference.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::WalletError;
use crate::store::{InMemoryRepository, Repository};
use crate::validator::{
    FineEngine, FineReceipt, FineSchedule, MAX_REPUTATION, RewardConfig, RewardReceipt,
    RewardSystem, Validator, ValidatorStatus, ViolationType,
};
use crate::wallet::trusty::{DEFAULT_LARGE_WITHDRAWAL_THRESHOLD, TransactionRecord, TrustyWallet};

/// Wallet rules that operators may tune
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletPolicy {
    /// Withdrawals above this amount need a validator approval
    pub large_withdrawal_threshold: f64,
    /// Reputation given to validators created on first reference
    pub initial_reputation: u32,
}

impl Default for WalletPolicy {
    fn default() -> Self {
        Self {
            large_withdrawal_threshold: DEFAULT_LARGE_WITHDRAWAL_THRESHOLD,
            initial_reputation: MAX_REPUTATION,
        }
    }
}

/// Balances of a single wallet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub user_id: String,
    pub balance: f64,
    pub total_balance: f64,
    pub locked_balance: f64,
}

/// Result of a lock or unlock
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeChange {
    pub transaction: TransactionRecord,
    pub validator_status: Option<ValidatorStatus>,
}

/// A transaction submitted for validation.
///
/// Every field is optional on the wire; missing fields make the claim invalid
/// rather than rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionClaim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl TransactionClaim {
    /// Positive amount, a type, and a source or destination
    pub fn is_well_formed(&self) -> bool {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.is_empty());

        self.amount.is_some_and(|a| a.is_finite() && a > 0.0)
            && present(&self.kind)
            && (present(&self.source) || present(&self.destination))
    }
}

/// How a validation attempt ended
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Transaction was well formed; the validator was paid
    Rewarded(RewardReceipt),
    /// Transaction was malformed; the validator was fined
    Fined(FineReceipt),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Rewarded(_))
    }
}

/// Main wallet manager
pub struct WalletManager {
    wallets: Arc<dyn Repository<TrustyWallet>>,
    validators: Arc<dyn Repository<Validator>>,
    policy: WalletPolicy,
    fine_engine: FineEngine,
    reward_system: RewardSystem,
}

impl WalletManager {
    /// Manager over fresh in-memory repositories
    pub fn new(policy: WalletPolicy) -> Self {
        Self::with_repositories(
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemoryRepository::new()),
            policy,
        )
    }

    pub fn with_repositories(
        wallets: Arc<dyn Repository<TrustyWallet>>,
        validators: Arc<dyn Repository<Validator>>,
        policy: WalletPolicy,
    ) -> Self {
        Self {
            wallets,
            validators,
            policy,
            fine_engine: FineEngine::default(),
            reward_system: RewardSystem::default(),
        }
    }

    pub fn with_fine_schedule(mut self, schedule: FineSchedule) -> Self {
        self.fine_engine = FineEngine::new(schedule);
        self
    }

    pub fn with_reward_config(mut self, config: RewardConfig) -> Self {
        self.reward_system = RewardSystem::new(config);
        self
    }

    pub fn policy(&self) -> &WalletPolicy {
        &self.policy
    }

    pub fn fine_engine(&self) -> &FineEngine {
        &self.fine_engine
    }

    pub fn reward_system(&self) -> &RewardSystem {
        &self.reward_system
    }

    // Wallet operations

    pub fn balance(&self, user_id: &str) -> BalanceSummary {
        let wallet = self.wallet(user_id);

        BalanceSummary {
            user_id: user_id.to_string(),
            balance: wallet.balance(),
            total_balance: wallet.total_balance(),
            locked_balance: wallet.locked_balance(),
        }
    }

    pub fn deposit(
        &mut self,
        user_id: &str,
        amount: f64,
        source: Option<String>,
    ) -> Result<TransactionRecord, WalletError> {
        let record = self.update_wallet(user_id, |wallet| wallet.deposit(amount, source))?;

        info!(user_id = %user_id, amount = amount, "Deposited funds");
        Ok(record)
    }

    pub fn withdraw(
        &mut self,
        user_id: &str,
        amount: f64,
        destination: Option<String>,
        validator_approval: Option<String>,
    ) -> Result<TransactionRecord, WalletError> {
        let threshold = self.policy.large_withdrawal_threshold;
        let record = self.update_wallet(user_id, |wallet| {
            wallet.withdraw(amount, destination, validator_approval, threshold)
        })?;

        info!(
            user_id = %user_id,
            amount = amount,
            approved = record.validator_approval.is_some(),
            "Withdrew funds"
        );
        Ok(record)
    }

    /// Stake funds. On a wallet's first lock, a standalone validator already
    /// known under the user id becomes the wallet's validator, keeping its
    /// reputation and history.
    pub fn lock_funds(&mut self, user_id: &str, amount: f64) -> Result<StakeChange, WalletError> {
        let standalone = self.validators.get(user_id);

        let (change, adopted) = self.update_wallet(user_id, |wallet| {
            let adopted = wallet.validator().is_none() && standalone.is_some();
            let transaction = wallet.lock_funds_with(amount, standalone)?;
            Ok((
                StakeChange {
                    transaction,
                    validator_status: wallet.validator_status(),
                },
                adopted,
            ))
        })?;

        if adopted {
            self.validators.remove(user_id);
            info!(user_id = %user_id, "Wallet took over standalone validator");
        }

        info!(user_id = %user_id, amount = amount, "Locked validator stake");
        Ok(change)
    }

    pub fn unlock_funds(&mut self, user_id: &str, amount: f64) -> Result<StakeChange, WalletError> {
        let change = self.update_wallet(user_id, |wallet| {
            let transaction = wallet.unlock_funds(amount)?;
            Ok(StakeChange {
                transaction,
                validator_status: wallet.validator_status(),
            })
        })?;

        info!(user_id = %user_id, amount = amount, "Unlocked validator stake");
        Ok(change)
    }

    /// Status of the validator owned by a wallet
    pub fn validator_status(&self, user_id: &str) -> Option<ValidatorStatus> {
        self.wallets
            .get(user_id)
            .and_then(|wallet| wallet.validator_status())
    }

    pub fn transaction_history(&self, user_id: &str) -> Vec<TransactionRecord> {
        self.wallet(user_id).transaction_history().to_vec()
    }

    // Validator operations

    /// Status of any validator, wallet-owned or standalone
    pub fn find_validator(&self, validator_id: &str) -> Option<ValidatorStatus> {
        self.validator_status(validator_id)
            .or_else(|| self.validators.get(validator_id).map(|v| v.status()))
    }

    /// Create a standalone validator; existing validators are returned untouched
    pub fn register_validator(
        &mut self,
        validator_id: &str,
        reputation: Option<u32>,
    ) -> ValidatorStatus {
        if let Some(status) = self.find_validator(validator_id) {
            debug!(validator_id = %validator_id, "Validator already registered");
            return status;
        }

        let reputation = reputation.unwrap_or(self.policy.initial_reputation);
        let validator = Validator::with_reputation(validator_id, reputation);
        let status = validator.status();
        self.validators.set(validator_id, validator);

        info!(
            validator_id = %validator_id,
            reputation = status.reputation,
            "Registered validator"
        );
        status
    }

    pub fn apply_fine(
        &mut self,
        validator_id: &str,
        violation: ViolationType,
        transaction_amount: f64,
        details: Option<&str>,
    ) -> Result<FineReceipt, WalletError> {
        let engine = &self.fine_engine;
        let receipt = self.update_validator(validator_id, |validator| {
            engine.apply_fine(validator, violation, transaction_amount, details)
        })?;

        info!(
            validator_id = %validator_id,
            violation = %receipt.violation_type,
            fine = receipt.fine_amount,
            reputation = receipt.result.reputation,
            "Applied fine to validator"
        );
        Ok(receipt)
    }

    pub fn award_reward(
        &mut self,
        validator_id: &str,
        transaction_amount: f64,
        details: Option<&str>,
    ) -> Result<RewardReceipt, WalletError> {
        let rewards = &self.reward_system;
        let receipt = self.update_validator(validator_id, |validator| {
            rewards.award_reward(validator, transaction_amount, details)
        })?;

        info!(
            validator_id = %validator_id,
            reward = receipt.reward_amount,
            reputation = receipt.result.reputation,
            "Awarded validator reward"
        );
        Ok(receipt)
    }

    /// Have a validator check a transaction.
    ///
    /// Inactive validators are rejected before anything changes. Otherwise a
    /// well-formed claim earns a reward and a malformed one an
    /// `invalid_validation` fine.
    pub fn validate_transaction(
        &mut self,
        validator_id: &str,
        claim: &TransactionClaim,
    ) -> Result<ValidationOutcome, WalletError> {
        let engine = &self.fine_engine;
        let rewards = &self.reward_system;

        let outcome = self.update_validator(validator_id, |validator| {
            if !validator.can_validate() {
                return Err(WalletError::ValidatorInactive);
            }

            if claim.is_well_formed() {
                let kind = claim.kind.as_deref().unwrap_or_default();
                let details = format!("Validated {} transaction", kind);
                rewards
                    .award_reward(validator, claim.amount.unwrap_or_default(), Some(&details))
                    .map(ValidationOutcome::Rewarded)
            } else {
                engine
                    .apply_fine(
                        validator,
                        ViolationType::InvalidValidation,
                        claim.amount.unwrap_or_default(),
                        Some("Failed to validate transaction"),
                    )
                    .map(ValidationOutcome::Fined)
            }
        });

        match &outcome {
            Ok(ValidationOutcome::Rewarded(receipt)) => info!(
                validator_id = %validator_id,
                reward = receipt.reward_amount,
                "Transaction validated"
            ),
            Ok(ValidationOutcome::Fined(receipt)) => warn!(
                validator_id = %validator_id,
                fine = receipt.fine_amount,
                "Transaction failed validation"
            ),
            Err(e) => warn!(validator_id = %validator_id, error = %e, "Validation refused"),
        }

        outcome
    }

    // Repository helpers

    fn wallet(&self, user_id: &str) -> TrustyWallet {
        self.wallets
            .get(user_id)
            .unwrap_or_else(|| TrustyWallet::new(user_id))
    }

    /// Run `op` on the wallet and store it only if `op` succeeds
    fn update_wallet<R>(
        &self,
        user_id: &str,
        op: impl FnOnce(&mut TrustyWallet) -> Result<R, WalletError>,
    ) -> Result<R, WalletError> {
        let mut wallet = self.wallet(user_id);
        let result = op(&mut wallet)?;
        self.wallets.set(user_id, wallet);
        Ok(result)
    }

    /// Run `op` on the resolved validator.
    ///
    /// A standalone validator is stored even when `op` fails, so the first
    /// reference always creates it. Failed operations leave it unchanged.
    fn update_validator<R>(
        &self,
        validator_id: &str,
        op: impl FnOnce(&mut Validator) -> Result<R, WalletError>,
    ) -> Result<R, WalletError> {
        if let Some(mut wallet) = self.wallets.get(validator_id)
            && let Some(validator) = wallet.validator_mut()
        {
            let result = op(validator)?;
            self.wallets.set(validator_id, wallet);
            return Ok(result);
        }

        let mut validator = self.validators.get(validator_id).unwrap_or_else(|| {
            debug!(validator_id = %validator_id, "Creating validator on first reference");
            Validator::with_reputation(validator_id, self.policy.initial_reputation)
        });
        let result = op(&mut validator);
        self.validators.set(validator_id, validator);
        result
    }
}

impl Default for WalletManager {
    fn default() -> Self {
        Self::new(WalletPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_validator(manager: &mut WalletManager, id: &str, reputation: u32, stake: f64) {
        manager.register_validator(id, Some(reputation));
        let mut validator = manager.validators.get(id).unwrap();
        validator.lock_funds(stake).unwrap();
        manager.validators.set(id, validator);
    }

    fn transfer(amount: f64) -> TransactionClaim {
        TransactionClaim {
            amount: Some(amount),
            kind: Some("transfer".to_string()),
            source: Some("A".to_string()),
            destination: None,
        }
    }

    #[test]
    fn test_balance_of_unknown_user() {
        let manager = WalletManager::default();
        let summary = manager.balance("nobody");

        assert_eq!(summary.balance, 0.0);
        assert_eq!(summary.total_balance, 0.0);
        assert!(manager.transaction_history("nobody").is_empty());
        assert!(manager.validator_status("nobody").is_none());
    }

    #[test]
    fn test_failed_operation_does_not_create_wallet() {
        let mut manager = WalletManager::default();

        assert!(manager.withdraw("user_1", 10.0, None, None).is_err());
        assert!(manager.wallets.is_empty());
    }

    #[test]
    fn test_stake_lifecycle() {
        let mut manager = WalletManager::default();
        manager.deposit("user_1", 500.0, Some("payroll".into())).unwrap();

        let locked = manager.lock_funds("user_1", 200.0).unwrap();
        assert_eq!(locked.validator_status.as_ref().unwrap().locked_amount, 200.0);

        let summary = manager.balance("user_1");
        assert_eq!(summary.balance, 300.0);
        assert_eq!(summary.locked_balance, 200.0);
        assert_eq!(summary.total_balance, 500.0);

        let unlocked = manager.unlock_funds("user_1", 200.0).unwrap();
        assert_eq!(unlocked.transaction.balance_after, 500.0);
        assert_eq!(manager.balance("user_1").locked_balance, 0.0);
        assert_eq!(manager.transaction_history("user_1").len(), 3);
    }

    #[test]
    fn test_withdraw_threshold_from_policy() {
        let mut manager = WalletManager::new(WalletPolicy {
            large_withdrawal_threshold: 100.0,
            ..WalletPolicy::default()
        });
        manager.deposit("user_1", 500.0, None).unwrap();

        assert_eq!(
            manager.withdraw("user_1", 150.0, None, None),
            Err(WalletError::ApprovalRequired { threshold: 100.0 })
        );
        assert!(manager.withdraw("user_1", 100.0, None, None).is_ok());
    }

    #[test]
    fn test_fine_creates_standalone_validator() {
        let mut manager = WalletManager::default();

        let receipt = manager
            .apply_fine("val_1", ViolationType::DoubleSpendAttempt, 1000.0, None)
            .unwrap();
        assert_eq!(receipt.fine_amount, 150.0);
        assert_eq!(receipt.result.reputation, 95);

        let status = manager.find_validator("val_1").unwrap();
        assert_eq!(status.fines, 150.0);
        assert_eq!(status.failed_validations, 1);
    }

    #[test]
    fn test_reward_targets_wallet_owned_validator() {
        let mut manager = WalletManager::default();
        manager.deposit("user_1", 100.0, None).unwrap();
        manager.lock_funds("user_1", 50.0).unwrap();

        let receipt = manager.award_reward("user_1", 0.0, Some("manual")).unwrap();
        assert_eq!(receipt.reward_amount, 10.0);

        let status = manager.validator_status("user_1").unwrap();
        assert_eq!(status.rewards, 10.0);
        assert_eq!(status.validated_transactions, 1);
        assert!(manager.validators.is_empty(), "no standalone copy");
    }

    #[test]
    fn test_first_lock_keeps_standalone_history() {
        let mut manager = WalletManager::default();
        for _ in 0..16 {
            manager
                .apply_fine("user_1", ViolationType::InvalidValidation, 0.0, None)
                .unwrap();
        }
        assert_eq!(manager.find_validator("user_1").unwrap().reputation, 20);

        manager.deposit("user_1", 500.0, None).unwrap();
        let change = manager.lock_funds("user_1", 100.0).unwrap();

        let status = change.validator_status.unwrap();
        assert_eq!(status.reputation, 20);
        assert_eq!(status.fines, 1200.0);
        assert_eq!(status.failed_validations, 16);
        assert_eq!(status.locked_amount, 100.0);
        assert!(manager.validators.is_empty(), "standalone record moved");

        manager
            .apply_fine("user_1", ViolationType::DelayedValidation, 0.0, None)
            .unwrap();
        let status = manager.find_validator("user_1").unwrap();
        assert_eq!(status.reputation, 15);
        assert_eq!(status.locked_amount, 100.0);
    }

    #[test]
    fn test_failed_first_lock_keeps_standalone_validator() {
        let mut manager = WalletManager::default();
        manager.register_validator("user_1", Some(40));
        manager.deposit("user_1", 50.0, None).unwrap();

        assert!(manager.lock_funds("user_1", 80.0).is_err());
        assert_eq!(manager.validators.len(), 1);

        manager.lock_funds("user_1", 20.0).unwrap();
        assert_eq!(manager.validator_status("user_1").unwrap().reputation, 40);
        assert_eq!(manager.register_validator("user_1", Some(90)).reputation, 40);
    }

    #[test]
    fn test_register_validator_is_idempotent() {
        let mut manager = WalletManager::default();

        assert_eq!(manager.register_validator("val_1", Some(40)).reputation, 40);
        assert_eq!(manager.register_validator("val_1", Some(90)).reputation, 40);
        assert_eq!(manager.register_validator("val_2", None).reputation, 100);
    }

    #[test]
    fn test_validate_rewards_well_formed_claim() {
        let mut manager = WalletManager::default();
        active_validator(&mut manager, "val_1", 50, 100.0);

        let outcome = manager.validate_transaction("val_1", &transfer(10.0)).unwrap();
        assert!(outcome.is_valid());

        let status = manager.find_validator("val_1").unwrap();
        assert_eq!(status.validated_transactions, 1);
        assert_eq!(status.reputation, 51);
    }

    #[test]
    fn test_validate_fines_malformed_claim() {
        let mut manager = WalletManager::default();
        active_validator(&mut manager, "val_1", 50, 100.0);

        let outcome = manager
            .validate_transaction("val_1", &transfer(0.0))
            .unwrap();
        match outcome {
            ValidationOutcome::Fined(receipt) => {
                assert_eq!(receipt.violation_type, ViolationType::InvalidValidation);
                assert_eq!(receipt.fine_amount, 75.0);
                assert_eq!(
                    receipt.reason,
                    "invalid_validation: Failed to validate transaction"
                );
            }
            other => panic!("expected fine, got {:?}", other),
        }

        let status = manager.find_validator("val_1").unwrap();
        assert_eq!(status.failed_validations, 1);
        assert_eq!(status.reputation, 45);
    }

    #[test]
    fn test_inactive_validator_is_refused() {
        let mut manager = WalletManager::default();

        assert_eq!(
            manager.validate_transaction("val_1", &transfer(10.0)),
            Err(WalletError::ValidatorInactive)
        );
        let status = manager.find_validator("val_1").unwrap();
        assert_eq!(status.validated_transactions, 0);
        assert_eq!(status.failed_validations, 0);

        active_validator(&mut manager, "val_low", 19, 100.0);
        assert_eq!(
            manager.validate_transaction("val_low", &transfer(10.0)),
            Err(WalletError::ValidatorInactive)
        );
    }

    #[test]
    fn test_claim_shape_checks() {
        assert!(transfer(1.0).is_well_formed());

        let mut claim = transfer(1.0);
        claim.source = None;
        assert!(!claim.is_well_formed());
        claim.destination = Some("B".into());
        assert!(claim.is_well_formed());

        claim.kind = Some(String::new());
        assert!(!claim.is_well_formed());

        assert!(!TransactionClaim::default().is_well_formed());
    }
}
