//! Trusty Wallet
//!
//! Spendable balance, locked validator stake and an append-only transaction
//! log. The wallet owns a [`Validator`] from its first lock on, either a fresh
//! one or an existing record handed over by the caller, and forwards every
//! stake change to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{WalletError, ensure_positive};
use crate::validator::{Validator, ValidatorStatus};

/// Withdrawals above this amount need a validator approval by default
pub const DEFAULT_LARGE_WITHDRAWAL_THRESHOLD: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Lock,
    Unlock,
}

/// One entry in a wallet's transaction log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_approval: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub balance_after: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_balance_after: Option<f64>,
}

impl TransactionRecord {
    fn new(kind: TransactionKind, amount: f64, balance_after: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            source: None,
            destination: None,
            validator_approval: None,
            timestamp: Utc::now(),
            balance_after,
            locked_balance_after: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustyWallet {
    user_id: String,
    balance: f64,
    locked_balance: f64,
    transactions: Vec<TransactionRecord>,
    validator: Option<Validator>,
}

impl TrustyWallet {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            balance: 0.0,
            locked_balance: 0.0,
            transactions: Vec::new(),
            validator: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Spendable balance, excluding stake
    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn locked_balance(&self) -> f64 {
        self.locked_balance
    }

    /// Spendable balance plus stake
    pub fn total_balance(&self) -> f64 {
        self.balance + self.locked_balance
    }

    pub fn deposit(
        &mut self,
        amount: f64,
        source: Option<String>,
    ) -> Result<TransactionRecord, WalletError> {
        ensure_positive(amount, "deposit")?;

        self.balance += amount;

        let mut record = TransactionRecord::new(TransactionKind::Deposit, amount, self.balance);
        record.source = source;
        Ok(self.record(record))
    }

    /// Withdraw spendable funds.
    ///
    /// Amounts above `approval_threshold` need a non-empty `validator_approval`.
    pub fn withdraw(
        &mut self,
        amount: f64,
        destination: Option<String>,
        validator_approval: Option<String>,
        approval_threshold: f64,
    ) -> Result<TransactionRecord, WalletError> {
        ensure_positive(amount, "withdrawal")?;
        if amount > self.balance {
            return Err(WalletError::InsufficientFunds);
        }

        let validator_approval = validator_approval.filter(|a| !a.is_empty());
        if amount > approval_threshold && validator_approval.is_none() {
            return Err(WalletError::ApprovalRequired {
                threshold: approval_threshold,
            });
        }

        self.balance -= amount;

        let mut record = TransactionRecord::new(TransactionKind::Withdrawal, amount, self.balance);
        record.destination = destination;
        record.validator_approval = validator_approval;
        Ok(self.record(record))
    }

    /// Move funds from the spendable balance into validator stake
    pub fn lock_funds(&mut self, amount: f64) -> Result<TransactionRecord, WalletError> {
        self.lock_funds_with(amount, None)
    }

    /// Like [`lock_funds`](Self::lock_funds), but a wallet without a validator
    /// takes over `existing` instead of starting a fresh one. Ignored when the
    /// wallet already owns a validator.
    pub fn lock_funds_with(
        &mut self,
        amount: f64,
        existing: Option<Validator>,
    ) -> Result<TransactionRecord, WalletError> {
        ensure_positive(amount, "lock")?;
        if amount > self.balance {
            return Err(WalletError::InsufficientFundsToLock);
        }

        let user_id = self.user_id.clone();
        self.validator
            .get_or_insert_with(|| existing.unwrap_or_else(|| Validator::new(user_id)))
            .lock_funds(amount)?;

        self.balance -= amount;
        self.locked_balance += amount;

        let mut record = TransactionRecord::new(TransactionKind::Lock, amount, self.balance);
        record.locked_balance_after = Some(self.locked_balance);
        Ok(self.record(record))
    }

    /// Move stake back into the spendable balance
    pub fn unlock_funds(&mut self, amount: f64) -> Result<TransactionRecord, WalletError> {
        ensure_positive(amount, "unlock")?;
        if amount > self.locked_balance {
            return Err(WalletError::InsufficientLockedFunds);
        }

        let validator = self.validator.as_mut().ok_or(WalletError::NoValidator)?;
        validator.unlock_funds(amount)?;

        self.locked_balance -= amount;
        self.balance += amount;

        let mut record = TransactionRecord::new(TransactionKind::Unlock, amount, self.balance);
        record.locked_balance_after = Some(self.locked_balance);
        Ok(self.record(record))
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    pub fn validator_mut(&mut self) -> Option<&mut Validator> {
        self.validator.as_mut()
    }

    /// `None` until the wallet has locked funds once
    pub fn validator_status(&self) -> Option<ValidatorStatus> {
        self.validator.as_ref().map(Validator::status)
    }

    pub fn transaction_history(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    fn record(&mut self, record: TransactionRecord) -> TransactionRecord {
        self.transactions.push(record.clone());
        record
    }
}
