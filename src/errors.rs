//! Unified error types and result handling.
//!
//! Core functions return `Result<T>` with this crate's `Error`; the API
//! layer converts errors into HTTP responses at the boundary (400 for bad
//! requests, 409 for redemption conflicts, 500 for everything downstream).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Unified error type for all core and boundary operations
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or validation failed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A request arrived without a required field or with an invalid value
    #[error("Validation error: {message}")]
    Validation {
        /// Which field/value was rejected
        message: String,
    },

    /// The requester's balance does not cover the reward
    #[error("Insufficient XP: have {current}, need {required}")]
    InsufficientXp {
        /// Balance at the time of the attempt
        current: i64,
        /// XP cost of the reward
        required: i64,
    },

    /// Reward row is gone - never existed, or a concurrent redemption won
    #[error("Reward {id} not found or already redeemed")]
    RewardNotFound {
        /// Reward primary key
        id: i64,
    },

    /// No profile row exists for the requested user
    #[error("No profile found for user {user_id}")]
    ProfileNotFound {
        /// The user that was looked up
        user_id: String,
    },

    /// The completion API call failed; carries the upstream message
    #[error("Generation failed: {0}")]
    Completion(#[from] crate::llm::LlmError),

    /// Any SeaORM persistence failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error (seed file reads, server bind)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Maps the error to the HTTP status code reported at the API boundary.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::InsufficientXp { .. } | Self::RewardNotFound { .. } => StatusCode::CONFLICT,
            Self::ProfileNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::Validation {
                message: "user_id is required".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InsufficientXp {
                current: 40,
                required: 100
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::RewardNotFound { id: 7 }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::Config {
                message: "bad".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
