//! Trusty Wallet
//!
//! Custodial wallets whose holders can stake funds to act as transaction
//! validators. Validators earn rewards for correct validations and pay fines
//! for violations, both of which move their reputation.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs          - Crate root with re-exports
//! ├── main.rs         - Server entrypoint
//! ├── config.rs       - Environment configuration
//! ├── error.rs        - Domain errors
//! ├── store/          - Keyed repositories
//! │   └── memory.rs   - DashMap-backed repository
//! ├── validator/      - Validator accounting
//! │   ├── stake.rs    - Validator stake, reputation, counters
//! │   ├── fine.rs     - Violation types and fine engine
//! │   └── reward.rs   - Reward calculation
//! ├── wallet/         - Wallets and orchestration
//! │   ├── trusty.rs   - Balances and transaction log
//! │   └── manager.rs  - Wallet manager
//! └── api/            - HTTP API
//!     ├── wallet.rs   - Wallet and validator endpoints
//!     ├── response.rs - JSON envelopes
//!     └── middleware.rs - Request guards
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod store;
pub mod validator;
pub mod wallet;

pub use config::ServiceConfig;
pub use error::WalletError;
pub use store::{InMemoryRepository, Repository};

// Re-export validator types
pub use validator::{
    FineEngine, FineReceipt, FineSchedule, RewardConfig, RewardReceipt, RewardSystem, Validator,
    ValidatorStatus, ViolationType,
};

// Re-export wallet types
pub use wallet::{
    BalanceSummary, StakeChange, TransactionClaim, TransactionKind, TransactionRecord,
    TrustyWallet, ValidationOutcome, WalletManager, WalletPolicy,
};

// Re-export API types
pub use api::{ApiError, GuardConfig, GuardState, WalletApiState, create_app};
