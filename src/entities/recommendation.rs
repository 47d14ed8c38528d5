//! Recommendation entity - Persisted generation results shown to the couple.
//!
//! A new row is written per generation; "latest" is `generated_at`
//! descending and history accumulates indefinitely (no retention policy).
//! `table_count` and `row_count` record gathering provenance so the UI can
//! show "based on N tables and M data points".

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recommendation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recommendations")]
pub struct Model {
    /// Unique identifier for the recommendation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User the recommendation was generated for
    pub user_id: String,
    /// Quiz key for quiz-scoped recommendations, None for the overall flavor
    pub quiz_key: Option<String>,
    /// The generated recommendation text
    pub recommendation: String,
    /// When the recommendation was generated
    pub generated_at: DateTimeUtc,
    /// Number of tables that contributed context
    pub table_count: i64,
    /// Total number of context rows across those tables
    pub row_count: i64,
}

/// Recommendations have no relations with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
