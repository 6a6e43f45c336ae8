//! Trusty wallets and the manager that serves them
//!
//! ```text
//! ┌───────────────┐     ┌───────────────┐     ┌───────────────────┐
//! │ TrustyWallet  │────►│ WalletManager │◄────│ Validator         │
//! │ (balance,     │     │ (orchestrator)│     │ (wallet-owned or  │
//! │  stake, log)  │     └───────────────┘     │  standalone)      │
//! └───────────────┘             │             └───────────────────┘
//!                               ▼
//!                      ┌──────────────────┐
//!                      │ FineEngine /     │
//!                      │ RewardSystem     │
//!                      └──────────────────┘
//! ```

mod manager;
mod trusty;

pub use manager::{
    BalanceSummary, StakeChange, TransactionClaim, ValidationOutcome, WalletManager, WalletPolicy,
};
pub use trusty::{
    DEFAULT_LARGE_WITHDRAWAL_THRESHOLD, TransactionKind, TransactionRecord, TrustyWallet,
};
