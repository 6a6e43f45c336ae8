//! Fine Engine
//!
//! Each violation carries a fixed base fine. Violations that involve moving
//! value (double spends, manipulated transactions) also pay a share of the
//! transaction amount.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WalletError;
use crate::validator::stake::{FineSnapshot, Validator};

/// Violations a validator can be fined for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ViolationType {
    UnauthorizedAccess,
    DoubleSpendAttempt,
    InvalidValidation,
    TransactionManipulation,
    DelayedValidation,
    /// Tag without a dedicated entry in the fine table
    Other(String),
}

impl ViolationType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "unauthorized_access" => ViolationType::UnauthorizedAccess,
            "double_spend_attempt" => ViolationType::DoubleSpendAttempt,
            "invalid_validation" => ViolationType::InvalidValidation,
            "transaction_manipulation" => ViolationType::TransactionManipulation,
            "delayed_validation" => ViolationType::DelayedValidation,
            other => ViolationType::Other(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            ViolationType::UnauthorizedAccess => "unauthorized_access",
            ViolationType::DoubleSpendAttempt => "double_spend_attempt",
            ViolationType::InvalidValidation => "invalid_validation",
            ViolationType::TransactionManipulation => "transaction_manipulation",
            ViolationType::DelayedValidation => "delayed_validation",
            ViolationType::Other(tag) => tag,
        }
    }

    /// Fixed part of the fine, `None` for unknown tags
    pub fn base_fine(&self) -> Option<f64> {
        match self {
            ViolationType::UnauthorizedAccess => Some(50.0),
            ViolationType::DoubleSpendAttempt => Some(100.0),
            ViolationType::InvalidValidation => Some(75.0),
            ViolationType::TransactionManipulation => Some(200.0),
            ViolationType::DelayedValidation => Some(25.0),
            ViolationType::Other(_) => None,
        }
    }

    /// Whether the fine grows with the transaction amount
    pub fn scales_with_amount(&self) -> bool {
        matches!(
            self,
            ViolationType::DoubleSpendAttempt | ViolationType::TransactionManipulation
        )
    }
}

impl From<String> for ViolationType {
    fn from(tag: String) -> Self {
        ViolationType::from_tag(&tag)
    }
}

impl From<ViolationType> for String {
    fn from(violation: ViolationType) -> Self {
        violation.as_tag().to_string()
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Fine parameters not tied to a specific violation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FineSchedule {
    /// Fine for tags without a table entry
    pub default_fine: f64,
    /// Share of the transaction amount added for value-moving violations
    pub transaction_rate: f64,
}

impl Default for FineSchedule {
    fn default() -> Self {
        Self {
            default_fine: 50.0,
            transaction_rate: 0.05,
        }
    }
}

/// Outcome of a fine applied to a validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FineReceipt {
    pub validator_id: String,
    pub violation_type: ViolationType,
    pub fine_amount: f64,
    pub reason: String,
    pub result: FineSnapshot,
}

#[derive(Debug, Clone, Default)]
pub struct FineEngine {
    schedule: FineSchedule,
}

impl FineEngine {
    pub fn new(schedule: FineSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &FineSchedule {
        &self.schedule
    }

    pub fn calculate_fine(&self, violation: &ViolationType, transaction_amount: f64) -> f64 {
        let mut fine = violation.base_fine().unwrap_or(self.schedule.default_fine);

        if transaction_amount > 0.0 && violation.scales_with_amount() {
            fine += transaction_amount * self.schedule.transaction_rate;
        }

        fine
    }

    /// Fine `validator` for `violation`.
    ///
    /// The recorded reason is the violation tag, followed by `": <details>"`
    /// when details are given.
    pub fn apply_fine(
        &self,
        validator: &mut Validator,
        violation: ViolationType,
        transaction_amount: f64,
        details: Option<&str>,
    ) -> Result<FineReceipt, WalletError> {
        let fine_amount = self.calculate_fine(&violation, transaction_amount);
        let reason = match details.filter(|d| !d.is_empty()) {
            Some(details) => format!("{}: {}", violation, details),
            None => violation.to_string(),
        };

        let result = validator.apply_fine(fine_amount, reason.clone())?;

        Ok(FineReceipt {
            validator_id: validator.validator_id().to_string(),
            violation_type: violation,
            fine_amount,
            reason,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_fines() {
        let engine = FineEngine::default();

        assert_eq!(engine.calculate_fine(&ViolationType::UnauthorizedAccess, 0.0), 50.0);
        assert_eq!(engine.calculate_fine(&ViolationType::InvalidValidation, 0.0), 75.0);
        assert_eq!(engine.calculate_fine(&ViolationType::DelayedValidation, 0.0), 25.0);
        assert_eq!(
            engine.calculate_fine(&ViolationType::TransactionManipulation, 0.0),
            200.0
        );
    }

    #[test]
    fn test_amount_scaled_fines() {
        let engine = FineEngine::default();

        assert_eq!(
            engine.calculate_fine(&ViolationType::DoubleSpendAttempt, 1000.0),
            150.0
        );
        assert_eq!(
            engine.calculate_fine(&ViolationType::TransactionManipulation, 2000.0),
            300.0
        );
        // Only value-moving violations scale
        assert_eq!(
            engine.calculate_fine(&ViolationType::InvalidValidation, 1000.0),
            75.0
        );
    }

    #[test]
    fn test_unknown_tag_uses_default() {
        let engine = FineEngine::default();
        let violation = ViolationType::from_tag("spamming");

        assert_eq!(violation, ViolationType::Other("spamming".to_string()));
        assert_eq!(engine.calculate_fine(&violation, 5000.0), 50.0);
    }

    #[test]
    fn test_tag_round_trip_through_serde() {
        let violation: ViolationType = serde_json::from_str("\"double_spend_attempt\"").unwrap();
        assert_eq!(violation, ViolationType::DoubleSpendAttempt);
        assert_eq!(
            serde_json::to_string(&ViolationType::from_tag("custom")).unwrap(),
            "\"custom\""
        );
    }

    #[test]
    fn test_apply_fine_reason() {
        let engine = FineEngine::default();
        let mut validator = Validator::new("val_1");

        let receipt = engine
            .apply_fine(
                &mut validator,
                ViolationType::DelayedValidation,
                0.0,
                Some("missed slot"),
            )
            .unwrap();
        assert_eq!(receipt.reason, "delayed_validation: missed slot");
        assert_eq!(receipt.fine_amount, 25.0);
        assert_eq!(receipt.result.reputation, 95);

        let receipt = engine
            .apply_fine(&mut validator, ViolationType::UnauthorizedAccess, 0.0, Some(""))
            .unwrap();
        assert_eq!(receipt.reason, "unauthorized_access");
        assert_eq!(receipt.result.failed_validations, 2);
    }
}
