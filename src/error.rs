//! Domain errors for wallet and validator operations.
//!
//! Every variant is a rule violation the caller can act on. A failed operation
//! leaves wallet and validator state exactly as it was before the call.

use thiserror::Error;

/// Errors raised by [`TrustyWallet`](crate::TrustyWallet),
/// [`Validator`](crate::Validator) and the [`WalletManager`](crate::WalletManager).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WalletError {
    /// Amount was zero, negative or not a finite number.
    #[error("Invalid {operation} amount")]
    InvalidAmount { operation: &'static str },

    /// Withdrawal larger than the spendable balance.
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Lock larger than the spendable balance.
    #[error("Insufficient funds to lock")]
    InsufficientFundsToLock,

    /// Unlock larger than the wallet's locked balance.
    #[error("Insufficient locked funds")]
    InsufficientLockedFunds,

    /// Unlock larger than the validator's stake.
    #[error("Cannot unlock more than locked amount")]
    ExceedsLockedStake,

    /// Withdrawal above the large-withdrawal threshold without approval.
    #[error("Validator approval required for large withdrawals (above {threshold})")]
    ApprovalRequired { threshold: f64 },

    /// Unlock on a wallet that never staked.
    #[error("No validator configured for this wallet")]
    NoValidator,

    /// Validator reputation or stake too low to validate.
    #[error("Validator is not active")]
    ValidatorInactive,
}

impl WalletError {
    pub(crate) fn invalid_amount(operation: &'static str) -> Self {
        WalletError::InvalidAmount { operation }
    }
}

/// Reject zero, negative and non-finite amounts.
pub(crate) fn ensure_positive(amount: f64, operation: &'static str) -> Result<(), WalletError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(WalletError::invalid_amount(operation))
    }
}
