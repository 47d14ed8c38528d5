//! XP ledger and reward endpoints.
//!
//! Balance/level reads, the fail-soft award endpoint, the reward catalog,
//! and redemption. Redemption conflicts (insufficient balance, reward
//! already gone) surface as 409.

use crate::{
    api::{AppState, require},
    core::{ledger, redemption},
    entities::{reward, reward_log, xp_transaction},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

/// Response for the balance/level read
#[derive(Debug, Serialize)]
pub struct LevelStatusResponse {
    /// Sum of the user's transaction deltas
    pub balance: i64,
    /// Current level
    pub level: i64,
    /// Progress within the current level
    pub progress: i64,
    /// Level length in effect
    pub level_length: i64,
    /// True when the default level length was applied
    pub level_length_defaulted: bool,
}

/// Request body for awards
#[derive(Debug, Deserialize)]
pub struct AwardRequest {
    /// User to credit (required)
    pub user_id: Option<String>,
    /// Role for the rule lookup (required)
    pub role: Option<String>,
    /// Action being rewarded (required)
    pub action: Option<String>,
    /// Optional effort tag
    pub effort: Option<String>,
    /// Free-text context woven into the transaction description
    pub context: Option<String>,
}

/// Response for awards; `awarded = false` means no rule matched and
/// nothing was written
#[derive(Debug, Serialize)]
pub struct AwardResponse {
    /// Whether a transaction was written
    pub awarded: bool,
    /// The XP delta, when awarded
    pub change: Option<i64>,
}

/// Request body for redemption
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    /// Redeeming user (required)
    pub user_id: Option<String>,
    /// Role recorded on the debit transaction (required)
    pub role: Option<String>,
}

/// GET /api/xp/:user_id
pub async fn level_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<LevelStatusResponse>> {
    let status = ledger::level_status(&state.db, &user_id).await?;

    Ok(Json(LevelStatusResponse {
        balance: status.balance,
        level: status.level,
        progress: status.progress,
        level_length: *status.level_length.value(),
        level_length_defaulted: status.level_length.is_defaulted(),
    }))
}

/// GET /api/xp/:user_id/transactions
pub async fn transactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<xp_transaction::Model>>> {
    let transactions = ledger::transactions_for_user(&state.db, &user_id).await?;
    Ok(Json(transactions))
}

/// POST /api/xp/award
pub async fn award(
    State(state): State<AppState>,
    Json(payload): Json<AwardRequest>,
) -> Result<Json<AwardResponse>> {
    let user_id = require(payload.user_id.as_ref(), "user_id")?;
    let role = require(payload.role.as_ref(), "role")?;
    let action = require(payload.action.as_ref(), "action")?;
    let context = payload.context.as_deref().unwrap_or_default();

    let outcome = ledger::award_xp(
        &state.db,
        &user_id,
        &action,
        payload.effort.as_deref(),
        &role,
        context,
    )
    .await?;

    let response = match outcome {
        ledger::AwardOutcome::Awarded(transaction) => AwardResponse {
            awarded: true,
            change: Some(transaction.change),
        },
        ledger::AwardOutcome::RuleMissing => AwardResponse {
            awarded: false,
            change: None,
        },
    };

    Ok(Json(response))
}

/// GET /api/rewards
pub async fn list_rewards(State(state): State<AppState>) -> Result<Json<Vec<reward::Model>>> {
    let rewards = redemption::list_rewards(&state.db).await?;
    Ok(Json(rewards))
}

/// GET /api/rewards/history
pub async fn redemption_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<reward_log::Model>>> {
    let history = redemption::redemption_history(&state.db).await?;
    Ok(Json(history))
}

/// POST /api/rewards/:id/redeem
pub async fn redeem(
    State(state): State<AppState>,
    Path(reward_id): Path<i64>,
    Json(payload): Json<RedeemRequest>,
) -> Result<Json<reward_log::Model>> {
    let user_id = require(payload.user_id.as_ref(), "user_id")?;
    let role = require(payload.role.as_ref(), "role")?;

    let log_entry = redemption::redeem(&state.db, &user_id, &role, reward_id).await?;
    Ok(Json(log_entry))
}

/// Routes for the XP and reward surface
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/xp/:user_id", get(level_status))
        .route("/xp/:user_id/transactions", get(transactions))
        .route("/xp/award", post(award))
        .route("/rewards", get(list_rewards))
        .route("/rewards/history", get(redemption_history))
        .route("/rewards/:id/redeem", post(redeem))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{ledger::record_transaction, redemption::create_reward},
        errors::Error,
        test_utils::*,
    };
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};

    fn award_request(user_id: Option<&str>, effort: Option<&str>) -> AwardRequest {
        AwardRequest {
            user_id: user_id.map(ToString::to_string),
            role: Some("mads".to_string()),
            action: Some("complete_parquiz".to_string()),
            effort: effort.map(ToString::to_string),
            context: Some("Love languages".to_string()),
        }
    }

    async fn error_response(err: Error) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_award_missing_user_id_is_400() -> Result<()> {
        let state = setup_test_state().await?;

        let err = award(State(state), Json(award_request(None, Some("low"))))
            .await
            .unwrap_err();

        let (status, body) = error_response(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("user_id"));

        Ok(())
    }

    #[tokio::test]
    async fn test_award_handler_reports_rule_outcome() -> Result<()> {
        let state = setup_test_state().await?;
        create_test_rule(&state.db, "mads", "complete_parquiz", Some("low"), 10).await?;

        let Json(response) = award(
            State(state.clone()),
            Json(award_request(Some("mads"), Some("low"))),
        )
        .await?;
        assert!(response.awarded);
        assert_eq!(response.change, Some(10));

        // A missing rule is still a 200, flagged through the body
        let Json(response) = award(
            State(state),
            Json(award_request(Some("mads"), Some("high"))),
        )
        .await?;
        assert!(!response.awarded);
        assert_eq!(response.change, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_level_status_handler_shape() -> Result<()> {
        let state = setup_test_state().await?;
        record_transaction(&state.db, "mads", "mads", 250, "quiz".to_string()).await?;

        let Json(status) = level_status(State(state), Path("mads".to_string())).await?;
        assert_eq!(status.balance, 250);
        assert_eq!(status.level, 2);
        assert_eq!(status.progress, 50);
        assert_eq!(status.level_length, 100);
        assert!(status.level_length_defaulted);

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_insufficient_balance_is_409() -> Result<()> {
        let state = setup_test_state().await?;
        let reward = create_reward(&state.db, "Spa day".to_string(), 100).await?;
        record_transaction(&state.db, "mads", "mads", 40, "quiz".to_string()).await?;

        let payload = RedeemRequest {
            user_id: Some("mads".to_string()),
            role: Some("mads".to_string()),
        };
        let err = redeem(State(state.clone()), Path(reward.id), Json(payload))
            .await
            .unwrap_err();

        let (status, body) = error_response(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.get("error").is_some());

        // Nothing was debited
        let Json(level) = level_status(State(state), Path("mads".to_string())).await?;
        assert_eq!(level.balance, 40);

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_unknown_reward_is_409() -> Result<()> {
        let state = setup_test_state().await?;
        record_transaction(&state.db, "mads", "mads", 500, "quiz".to_string()).await?;

        let payload = RedeemRequest {
            user_id: Some("mads".to_string()),
            role: Some("mads".to_string()),
        };
        let err = redeem(State(state), Path(999), Json(payload))
            .await
            .unwrap_err();

        let (status, _) = error_response(err).await;
        assert_eq!(status, StatusCode::CONFLICT);

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_success_returns_log_entry() -> Result<()> {
        let state = setup_test_state().await?;
        let reward = create_reward(&state.db, "Spa day".to_string(), 100).await?;
        record_transaction(&state.db, "mads", "mads", 150, "quiz".to_string()).await?;

        let payload = RedeemRequest {
            user_id: Some("mads".to_string()),
            role: Some("mads".to_string()),
        };
        let Json(entry) = redeem(State(state.clone()), Path(reward.id), Json(payload)).await?;
        assert_eq!(entry.title, "Spa day");
        assert_eq!(entry.required_xp, 100);

        let Json(level) = level_status(State(state), Path("mads".to_string())).await?;
        assert_eq!(level.balance, 50);

        Ok(())
    }
}
