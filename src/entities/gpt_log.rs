//! GPT log entity - Append-only audit trail of every generation call.
//!
//! One row per completion attempt, capturing the (possibly truncated)
//! prompt, the response, token accounting, and which tables contributed
//! context. Never mutated after insert.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// GPT log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gpt_log")]
pub struct Model {
    /// Unique identifier for the log row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User the generation was performed for
    pub user_id: String,
    /// Route or widget that triggered the call (e.g. `"overall-recommendation"`)
    pub widget: String,
    /// The prompt that was sent, truncated at the configured log limit
    pub prompt: String,
    /// The generated text (or error description on failed attempts)
    pub response: String,
    /// Model name used for the completion
    pub model: String,
    /// Total tokens as reported by the API, or the estimate fallback
    pub total_tokens: i64,
    /// Prompt tokens as reported by the API (0 when unreported)
    pub prompt_tokens: i64,
    /// Completion tokens as reported by the API (0 when unreported)
    pub completion_tokens: i64,
    /// Comma-separated list of tables that contributed context rows
    pub tables_used: String,
    /// When the log row was written
    pub created_at: DateTimeUtc,
}

/// Log rows have no relations with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
