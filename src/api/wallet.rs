//! Trusty Wallet API endpoints
//!
//! Endpoints:
//!   GET  /{user_id}/balance                -> Spendable, locked and total balance
//!   POST /{user_id}/deposit                -> Add funds
//!   POST /{user_id}/withdraw               -> Remove funds (approval above threshold)
//!   POST /{user_id}/lock                   -> Stake funds as validator
//!   POST /{user_id}/unlock                 -> Release stake
//!   GET  /{user_id}/validator              -> Wallet-owned validator status
//!   GET  /{user_id}/transactions           -> Full transaction log
//!   POST /validator/{validator_id}/register -> Create a standalone validator
//!   GET  /validator/{validator_id}/status  -> Any validator's status
//!   POST /validator/{validator_id}/fine    -> Fine a validator
//!   POST /validator/{validator_id}/reward  -> Reward a validator
//!   POST /validator/{validator_id}/validate -> Validate a transaction
//!   GET  /policy                           -> Wallet, fine and reward parameters
//!
//! Two-segment paths under `/validator` are answered with 400, so
//! `validator` cannot be used as a user id.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{any, get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::response::{ApiError, require_amount};
use crate::validator::{
    FineReceipt, FineSchedule, RewardConfig, RewardReceipt, ValidatorStatus, ViolationType,
};
use crate::wallet::{
    BalanceSummary, TransactionClaim, TransactionRecord, ValidationOutcome, WalletManager,
    WalletPolicy,
};

/// Leading segment of the validator routes
pub const RESERVED_USER_ID: &str = "validator";

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct WalletApiState {
    pub manager: Arc<RwLock<WalletManager>>,
}

impl WalletApiState {
    pub fn new(manager: WalletManager) -> Self {
        Self {
            manager: Arc::new(RwLock::new(manager)),
        }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub amount: Option<f64>,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub amount: Option<f64>,
    pub destination: Option<String>,
    pub validator_approval: Option<String>,
}

/// Body of lock and unlock requests
#[derive(Debug, Deserialize)]
pub struct StakeRequest {
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FineRequest {
    pub violation_type: Option<String>,
    pub transaction_amount: Option<f64>,
    pub details: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRequest {
    pub transaction_amount: Option<f64>,
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub transaction: Option<TransactionClaim>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterValidatorRequest {
    pub reputation: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    #[serde(flatten)]
    pub balance: BalanceSummary,
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub user_id: String,
    pub transaction: TransactionRecord,
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeResponse {
    pub user_id: String,
    pub transaction: TransactionRecord,
    pub validator_status: Option<ValidatorStatus>,
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletValidatorResponse {
    pub user_id: String,
    pub validator_status: Option<ValidatorStatus>,
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorResponse {
    pub validator_id: String,
    pub validator_status: ValidatorStatus,
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub user_id: String,
    pub transactions: Vec<TransactionRecord>,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct FineResponse {
    #[serde(flatten)]
    pub receipt: FineReceipt,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct RewardResponse {
    #[serde(flatten)]
    pub receipt: RewardReceipt,
    pub success: bool,
}

/// `success` mirrors `validation_result`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub validator_id: String,
    pub transaction: TransactionClaim,
    pub validation_result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<RewardReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fine: Option<FineReceipt>,
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FineTableEntry {
    pub violation_type: ViolationType,
    pub base_fine: f64,
    pub scales_with_amount: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResponse {
    pub wallet: WalletPolicy,
    pub fine_schedule: FineSchedule,
    pub fine_table: Vec<FineTableEntry>,
    pub reward_config: RewardConfig,
}

// ============================================================================
// API Handlers
// ============================================================================

pub async fn get_balance(
    State(state): State<WalletApiState>,
    Path(user_id): Path<String>,
) -> Json<BalanceResponse> {
    let manager = state.manager.read().await;
    debug!(user_id = %user_id, "Balance lookup");

    Json(BalanceResponse {
        balance: manager.balance(&user_id),
        success: true,
    })
}

pub async fn deposit(
    State(state): State<WalletApiState>,
    Path(user_id): Path<String>,
    payload: Result<Json<DepositRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let Json(request) = payload?;
    let amount = require_amount(request.amount)?;

    let mut manager = state.manager.write().await;
    let transaction = manager
        .deposit(&user_id, amount, request.source)
        .map_err(|e| user_error(e, &user_id))?;

    Ok(Json(TransactionResponse {
        user_id,
        transaction,
        success: true,
    }))
}

pub async fn withdraw(
    State(state): State<WalletApiState>,
    Path(user_id): Path<String>,
    payload: Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let Json(request) = payload?;
    let amount = require_amount(request.amount)?;

    let mut manager = state.manager.write().await;
    let transaction = manager
        .withdraw(
            &user_id,
            amount,
            request.destination,
            request.validator_approval,
        )
        .map_err(|e| user_error(e, &user_id))?;

    Ok(Json(TransactionResponse {
        user_id,
        transaction,
        success: true,
    }))
}

pub async fn lock_funds(
    State(state): State<WalletApiState>,
    Path(user_id): Path<String>,
    payload: Result<Json<StakeRequest>, JsonRejection>,
) -> Result<Json<StakeResponse>, ApiError> {
    let Json(request) = payload?;
    let amount = require_amount(request.amount)?;

    let mut manager = state.manager.write().await;
    let change = manager
        .lock_funds(&user_id, amount)
        .map_err(|e| user_error(e, &user_id))?;

    Ok(Json(StakeResponse {
        user_id,
        transaction: change.transaction,
        validator_status: change.validator_status,
        success: true,
    }))
}

pub async fn unlock_funds(
    State(state): State<WalletApiState>,
    Path(user_id): Path<String>,
    payload: Result<Json<StakeRequest>, JsonRejection>,
) -> Result<Json<StakeResponse>, ApiError> {
    let Json(request) = payload?;
    let amount = require_amount(request.amount)?;

    let mut manager = state.manager.write().await;
    let change = manager
        .unlock_funds(&user_id, amount)
        .map_err(|e| user_error(e, &user_id))?;

    Ok(Json(StakeResponse {
        user_id,
        transaction: change.transaction,
        validator_status: change.validator_status,
        success: true,
    }))
}

pub async fn get_wallet_validator(
    State(state): State<WalletApiState>,
    Path(user_id): Path<String>,
) -> Json<WalletValidatorResponse> {
    let manager = state.manager.read().await;
    let validator_status = manager.validator_status(&user_id);

    Json(WalletValidatorResponse {
        user_id,
        validator_status,
        success: true,
    })
}

pub async fn get_transactions(
    State(state): State<WalletApiState>,
    Path(user_id): Path<String>,
) -> Json<HistoryResponse> {
    let manager = state.manager.read().await;
    let transactions = manager.transaction_history(&user_id);

    Json(HistoryResponse {
        user_id,
        transactions,
        success: true,
    })
}

pub async fn register_validator(
    State(state): State<WalletApiState>,
    Path(validator_id): Path<String>,
    payload: Result<Json<RegisterValidatorRequest>, JsonRejection>,
) -> Result<Json<ValidatorResponse>, ApiError> {
    let Json(request) = payload?;

    let mut manager = state.manager.write().await;
    let validator_status = manager.register_validator(&validator_id, request.reputation);

    Ok(Json(ValidatorResponse {
        validator_id,
        validator_status,
        success: true,
    }))
}

pub async fn get_validator(
    State(state): State<WalletApiState>,
    Path(validator_id): Path<String>,
) -> Result<Json<ValidatorResponse>, ApiError> {
    let manager = state.manager.read().await;

    match manager.find_validator(&validator_id) {
        Some(validator_status) => Ok(Json(ValidatorResponse {
            validator_id,
            validator_status,
            success: true,
        })),
        None => Err(ApiError::not_found("Validator not found").with("validatorId", validator_id)),
    }
}

pub async fn apply_fine(
    State(state): State<WalletApiState>,
    Path(validator_id): Path<String>,
    payload: Result<Json<FineRequest>, JsonRejection>,
) -> Result<Json<FineResponse>, ApiError> {
    let Json(request) = payload?;
    let violation = match request.violation_type.as_deref() {
        Some(tag) if !tag.is_empty() => ViolationType::from_tag(tag),
        _ => return Err(ApiError::bad_request("Missing violation type")),
    };

    let mut manager = state.manager.write().await;
    let receipt = manager
        .apply_fine(
            &validator_id,
            violation.clone(),
            request.transaction_amount.unwrap_or_default(),
            request.details.as_deref(),
        )
        .map_err(|e| {
            validator_error(e, &validator_id).with("violationType", violation.as_tag())
        })?;

    Ok(Json(FineResponse {
        receipt,
        success: true,
    }))
}

pub async fn award_reward(
    State(state): State<WalletApiState>,
    Path(validator_id): Path<String>,
    payload: Result<Json<RewardRequest>, JsonRejection>,
) -> Result<Json<RewardResponse>, ApiError> {
    let Json(request) = payload?;

    let mut manager = state.manager.write().await;
    let receipt = manager
        .award_reward(
            &validator_id,
            request.transaction_amount.unwrap_or_default(),
            request.details.as_deref(),
        )
        .map_err(|e| validator_error(e, &validator_id))?;

    Ok(Json(RewardResponse {
        receipt,
        success: true,
    }))
}

pub async fn validate_transaction(
    State(state): State<WalletApiState>,
    Path(validator_id): Path<String>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidationResponse>, ApiError> {
    let Json(request) = payload?;
    let transaction = request
        .transaction
        .ok_or_else(|| ApiError::bad_request("Missing transaction"))?;

    let mut manager = state.manager.write().await;
    let outcome = manager
        .validate_transaction(&validator_id, &transaction)
        .map_err(|e| validator_error(e, &validator_id))?;

    let validation_result = outcome.is_valid();
    let (reward, fine) = match outcome {
        ValidationOutcome::Rewarded(receipt) => (Some(receipt), None),
        ValidationOutcome::Fined(receipt) => (None, Some(receipt)),
    };

    Ok(Json(ValidationResponse {
        validator_id,
        transaction,
        validation_result,
        reward,
        fine,
        success: validation_result,
    }))
}

pub async fn get_policy(State(state): State<WalletApiState>) -> Json<PolicyResponse> {
    let manager = state.manager.read().await;
    let fine_schedule = manager.fine_engine().schedule().clone();

    let fine_table = [
        ViolationType::UnauthorizedAccess,
        ViolationType::DoubleSpendAttempt,
        ViolationType::InvalidValidation,
        ViolationType::TransactionManipulation,
        ViolationType::DelayedValidation,
    ]
    .into_iter()
    .map(|violation| FineTableEntry {
        base_fine: violation.base_fine().unwrap_or(fine_schedule.default_fine),
        scales_with_amount: violation.scales_with_amount(),
        violation_type: violation,
    })
    .collect();

    Json(PolicyResponse {
        wallet: manager.policy().clone(),
        fine_schedule,
        fine_table,
        reward_config: manager.reward_system().config().clone(),
    })
}

pub async fn reserved_user_id() -> ApiError {
    ApiError::bad_request(format!("User id '{}' is reserved", RESERVED_USER_ID))
        .with("userId", RESERVED_USER_ID)
}

fn user_error(error: crate::error::WalletError, user_id: &str) -> ApiError {
    warn!(user_id = %user_id, error = %error, "Wallet operation rejected");
    ApiError::from(error).with("userId", user_id)
}

fn validator_error(error: crate::error::WalletError, validator_id: &str) -> ApiError {
    warn!(validator_id = %validator_id, error = %error, "Validator operation rejected");
    ApiError::from(error).with("validatorId", validator_id)
}

/// Create the wallet API router
pub fn create_router(state: WalletApiState) -> Router {
    Router::new()
        .route("/policy", get(get_policy))
        .route("/{user_id}/balance", get(get_balance))
        .route("/{user_id}/deposit", post(deposit))
        .route("/{user_id}/withdraw", post(withdraw))
        .route("/{user_id}/lock", post(lock_funds))
        .route("/{user_id}/unlock", post(unlock_funds))
        .route("/{user_id}/validator", get(get_wallet_validator))
        .route("/{user_id}/transactions", get(get_transactions))
        .route("/validator/{validator_id}", any(reserved_user_id))
        .route("/validator/{validator_id}/status", get(get_validator))
        .route("/validator/{validator_id}/register", post(register_validator))
        .route("/validator/{validator_id}/fine", post(apply_fine))
        .route("/validator/{validator_id}/reward", post(award_reward))
        .route("/validator/{validator_id}/validate", post(validate_transaction))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn state() -> WalletApiState {
        WalletApiState::new(WalletManager::default())
    }

    fn user(id: &str) -> Path<String> {
        Path(id.to_string())
    }

    async fn fund(state: &WalletApiState, user_id: &str, amount: f64) {
        deposit(
            State(state.clone()),
            user(user_id),
            Ok(Json(DepositRequest {
                amount: Some(amount),
                source: Some("payroll".to_string()),
            })),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_deposit_and_balance() {
        let state = state();
        fund(&state, "user_1", 500.0).await;

        let Json(balance) = get_balance(State(state.clone()), user("user_1")).await;
        assert_eq!(balance.balance.balance, 500.0);
        assert_eq!(balance.balance.total_balance, 500.0);

        let json = serde_json::to_value(&balance).unwrap();
        assert_eq!(json["userId"], "user_1");
        assert_eq!(json["lockedBalance"], 0.0);
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_bad_request() {
        let state = state();

        let error = deposit(
            State(state.clone()),
            user("user_1"),
            Ok(Json(DepositRequest {
                amount: Some(-5.0),
                source: None,
            })),
        )
        .await
        .unwrap_err();

        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.message(), "Invalid amount");

        let error = lock_funds(
            State(state.clone()),
            user("user_1"),
            Ok(Json(StakeRequest { amount: None })),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_domain_failure_is_unprocessable() {
        let state = state();
        fund(&state, "user_1", 2000.0).await;

        let error = withdraw(
            State(state.clone()),
            user("user_1"),
            Ok(Json(WithdrawRequest {
                amount: Some(1500.0),
                destination: Some("bank".to_string()),
                validator_approval: None,
            })),
        )
        .await
        .unwrap_err();

        assert_eq!(error.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error.body()["userId"], "user_1");
        assert!(error.message().starts_with("Validator approval required"));

        let Json(balance) = get_balance(State(state.clone()), user("user_1")).await;
        assert_eq!(balance.balance.balance, 2000.0);
    }

    #[tokio::test]
    async fn test_lock_reports_validator_status() {
        let state = state();
        fund(&state, "user_1", 500.0).await;

        let Json(response) = lock_funds(
            State(state.clone()),
            user("user_1"),
            Ok(Json(StakeRequest { amount: Some(200.0) })),
        )
        .await
        .unwrap();

        let status = response.validator_status.unwrap();
        assert_eq!(status.locked_amount, 200.0);
        assert!(status.is_active);

        let Json(wallet_validator) =
            get_wallet_validator(State(state.clone()), user("user_1")).await;
        assert_eq!(wallet_validator.validator_status.unwrap().locked_amount, 200.0);

        let Json(history) = get_transactions(State(state.clone()), user("user_1")).await;
        assert_eq!(history.transactions.len(), 2);
    }

    #[tokio::test]
    async fn test_fine_requires_violation_type() {
        let state = state();

        let error = apply_fine(
            State(state.clone()),
            user("val_1"),
            Ok(Json(FineRequest {
                violation_type: None,
                transaction_amount: None,
                details: None,
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.message(), "Missing violation type");
    }

    #[tokio::test]
    async fn test_fine_envelope() {
        let state = state();

        let Json(response) = apply_fine(
            State(state.clone()),
            user("val_1"),
            Ok(Json(FineRequest {
                violation_type: Some("double_spend_attempt".to_string()),
                transaction_amount: Some(1000.0),
                details: Some("seen twice".to_string()),
            })),
        )
        .await
        .unwrap();

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["validatorId"], "val_1");
        assert_eq!(json["violationType"], "double_spend_attempt");
        assert_eq!(json["fineAmount"], 150.0);
        assert_eq!(json["reason"], "double_spend_attempt: seen twice");
        assert_eq!(json["result"]["reputation"], 95);
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_reward_envelope() {
        let state = state();

        let Json(response) = award_reward(
            State(state.clone()),
            user("val_1"),
            Ok(Json(RewardRequest::default())),
        )
        .await
        .unwrap();

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["rewardAmount"], 10.0);
        assert_eq!(json["result"]["validatedTransactions"], 1);
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_validate_flow() {
        let state = state();
        fund(&state, "val_1", 300.0).await;
        let Json(locked) = lock_funds(
            State(state.clone()),
            user("val_1"),
            Ok(Json(StakeRequest { amount: Some(100.0) })),
        )
        .await
        .unwrap();
        assert_eq!(locked.validator_status.unwrap().locked_amount, 100.0);

        let claim: TransactionClaim =
            serde_json::from_value(serde_json::json!({"amount": 10, "type": "transfer", "source": "A"}))
                .unwrap();
        let Json(valid) = validate_transaction(
            State(state.clone()),
            user("val_1"),
            Ok(Json(ValidateRequest {
                transaction: Some(claim),
            })),
        )
        .await
        .unwrap();
        assert!(valid.validation_result);
        assert!(valid.success);
        assert!(valid.reward.is_some());

        let Json(invalid) = validate_transaction(
            State(state.clone()),
            user("val_1"),
            Ok(Json(ValidateRequest {
                transaction: Some(TransactionClaim {
                    amount: Some(0.0),
                    ..TransactionClaim::default()
                }),
            })),
        )
        .await
        .unwrap();
        assert!(!invalid.validation_result);
        assert!(!invalid.success);
        assert_eq!(invalid.fine.unwrap().fine_amount, 75.0);
    }

    #[tokio::test]
    async fn test_validate_inactive_and_missing_transaction() {
        let state = state();

        let error = validate_transaction(
            State(state.clone()),
            user("val_idle"),
            Ok(Json(ValidateRequest { transaction: None })),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);

        let error = validate_transaction(
            State(state.clone()),
            user("val_idle"),
            Ok(Json(ValidateRequest {
                transaction: Some(TransactionClaim::default()),
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error.message(), "Validator is not active");
        assert_eq!(error.body()["validatorId"], "val_idle");
    }

    #[tokio::test]
    async fn test_register_and_lookup_validator() {
        let state = state();

        let error = get_validator(State(state.clone()), user("val_9"))
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::NOT_FOUND);

        let Json(registered) = register_validator(
            State(state.clone()),
            user("val_9"),
            Ok(Json(RegisterValidatorRequest {
                reputation: Some(60),
            })),
        )
        .await
        .unwrap();
        assert_eq!(registered.validator_status.reputation, 60);

        let Json(found) = get_validator(State(state.clone()), user("val_9"))
            .await
            .unwrap();
        assert!(!found.validator_status.is_active);
    }

    #[tokio::test]
    async fn test_policy_lists_fine_table() {
        let Json(policy) = get_policy(State(state())).await;

        assert_eq!(policy.wallet.large_withdrawal_threshold, 1000.0);
        assert_eq!(policy.fine_table.len(), 5);
        assert_eq!(policy.fine_schedule.default_fine, 50.0);
        assert!(
            policy
                .fine_table
                .iter()
                .any(|e| e.violation_type == ViolationType::TransactionManipulation
                    && e.base_fine == 200.0
                    && e.scales_with_amount)
        );
    }

    async fn send(router: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_reserved_user_id_is_rejected() {
        let router = create_router(state());

        for (method, uri) in [
            ("POST", "/validator/deposit"),
            ("GET", "/validator/balance"),
            ("POST", "/validator/lock"),
            ("GET", "/validator/transactions"),
        ] {
            let (status, body) = send(router.clone(), method, uri, r#"{"amount": 10}"#).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
            assert_eq!(body["error"], "User id 'validator' is reserved");
            assert_eq!(body["userId"], "validator");
            assert_eq!(body["success"], false);
        }
    }

    #[tokio::test]
    async fn test_routes_resolve_without_collisions() {
        let router = create_router(state());

        let (status, body) =
            send(router.clone(), "POST", "/balance/deposit", r#"{"amount": 25}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], "balance");

        let (status, body) = send(router.clone(), "GET", "/validator/val_3/status", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["validatorId"], "val_3");

        let (status, _) = send(
            router.clone(),
            "POST",
            "/validator/val_3/register",
            r#"{"reputation": 55}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(router.clone(), "GET", "/validator/val_3/status", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["validatorStatus"]["reputation"], 55);

        // A user may still be called `status`
        let (status, body) = send(router, "GET", "/status/balance", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], "status");
    }
}
