//! API layer - HTTP interface over the core.
//!
//! A thin axum transport: handlers validate the request, call the
//! framework-agnostic core functions, and convert errors to HTTP responses.
//! Caller-supplied `user_id` is trusted at this boundary; row-level
//! authorization belongs to the storage layer outside this crate.

/// Recommendation generation endpoints
pub mod recommendations;
/// XP ledger and reward endpoints
pub mod xp;

use crate::{
    core::recommend::RecommendationService,
    errors::{Error, Result},
};
use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;

/// Extracts a required request field, trimmed. Absent and all-whitespace
/// values both yield a validation error naming the field.
pub(crate) fn require(field: Option<&String>, name: &str) -> Result<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::Validation {
            message: format!("{name} is required"),
        })
}

/// Shared state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all persistence
    pub db: DatabaseConnection,
    /// Recommendation generation service (completion client + log limit)
    pub recommendations: RecommendationService,
}

impl AppState {
    /// Creates the shared handler state.
    #[must_use]
    pub const fn new(db: DatabaseConnection, recommendations: RecommendationService) -> Self {
        Self { db, recommendations }
    }
}

/// Builds the full application router under `/api`.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(recommendations::router())
                .merge(xp::router()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_require_rejects_missing_and_blank() {
        assert!(require(None, "user_id").is_err());
        assert!(require(Some(&"  ".to_string()), "user_id").is_err());
    }

    #[test]
    fn test_require_trims() {
        let value = " mads ".to_string();
        assert_eq!(require(Some(&value), "user_id").unwrap(), "mads");
    }
}
