//! Data source entity - Administrator-configured LLM context sources.
//!
//! Each row names a table whose contents are eligible to be included as
//! context for recommendation generation. Disabled sources are skipped
//! entirely; enabled sources are read in ascending `priority` order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Data source descriptor database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "data_sources")]
pub struct Model {
    /// Unique identifier for the descriptor
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the table to read rows from
    #[sea_orm(unique)]
    pub table_name: String,
    /// Human-readable description included in the prompt block
    pub description: String,
    /// Whether this source participates in gathering
    pub enabled: bool,
    /// Ascending read order; lower values are gathered first
    pub priority: i64,
}

/// Descriptors have no relations with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
