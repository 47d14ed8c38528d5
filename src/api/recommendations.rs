//! Recommendation endpoints.
//!
//! `POST /api/quiz-recommendation` and `POST /api/overall-recommendation`.
//! Missing required fields yield 400; downstream failures (storage or the
//! completion API) yield 500 with an `{error}` body; success yields 200
//! `{recommendation}`.

use crate::{
    api::{AppState, require},
    core::gather,
    errors::{Error, Result},
};
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

/// Request body for the quiz-scoped flavor
#[derive(Debug, Deserialize)]
pub struct QuizRecommendationRequest {
    /// User the recommendation is for (required)
    pub user_id: Option<String>,
    /// Free-text summary of the quiz result (required)
    pub quiz_summary: Option<String>,
    /// Free-text relationship background
    pub background: Option<String>,
    /// Tone for the generated text
    pub tone: Option<String>,
    /// Optional quiz key for scoping the persisted record
    pub quiz_key: Option<String>,
}

/// Request body for the overall flavor
#[derive(Debug, Deserialize)]
pub struct OverallRecommendationRequest {
    /// User the recommendation is for (required)
    pub user_id: Option<String>,
    /// Tone for the generated text
    pub tone: Option<String>,
    /// Generate for the user's partner instead
    #[serde(default)]
    pub for_partner: bool,
}

/// Response body for both flavors
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    /// The generated recommendation text
    pub recommendation: String,
}

const DEFAULT_TONE: &str = "warm";

/// POST /api/quiz-recommendation
pub async fn quiz_recommendation(
    State(state): State<AppState>,
    Json(payload): Json<QuizRecommendationRequest>,
) -> Result<Json<RecommendationResponse>> {
    let user_id = require(payload.user_id.as_ref(), "user_id")?;
    let quiz_summary = require(payload.quiz_summary.as_ref(), "quiz_summary")?;
    let background = payload.background.as_deref().unwrap_or_default();
    let tone = payload.tone.as_deref().unwrap_or(DEFAULT_TONE);

    let recommendation = state
        .recommendations
        .quiz_recommendation(
            &state.db,
            &user_id,
            payload.quiz_key.as_deref(),
            &quiz_summary,
            background,
            tone,
        )
        .await?;

    Ok(Json(RecommendationResponse { recommendation }))
}

/// POST /api/overall-recommendation
pub async fn overall_recommendation(
    State(state): State<AppState>,
    Json(payload): Json<OverallRecommendationRequest>,
) -> Result<Json<RecommendationResponse>> {
    let requester = require(payload.user_id.as_ref(), "user_id")?;
    let tone = payload.tone.as_deref().unwrap_or(DEFAULT_TONE);

    let target = if payload.for_partner {
        resolve_partner(&state, &requester).await?
    } else {
        requester
    };

    let recommendation = state
        .recommendations
        .overall_recommendation(&state.db, &target, tone)
        .await?;

    Ok(Json(RecommendationResponse { recommendation }))
}

/// Resolves the requester's partner from their profile row.
async fn resolve_partner(state: &AppState, user_id: &str) -> Result<String> {
    let profile = gather::fetch_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| Error::ProfileNotFound {
            user_id: user_id.to_string(),
        })?;

    profile.partner_id.ok_or_else(|| Error::Validation {
        message: format!("No partner configured for user {user_id}"),
    })
}

/// Routes for both recommendation flavors
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quiz-recommendation", post(quiz_recommendation))
        .route("/overall-recommendation", post(overall_recommendation))
}
