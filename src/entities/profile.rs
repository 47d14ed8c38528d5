//! Profile entity - Per-member relationship profile used as prompt context.
//!
//! The data gatherer renders this row into a labeled key/value block,
//! excluding identity/internal fields and empty values. Free-text fields
//! here are what the couple filled in about themselves.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Unique identifier for the profile
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning household member
    #[sea_orm(unique)]
    pub user_id: String,
    /// The other member of the household
    pub partner_id: Option<String>,
    /// Display name shown in the UI, excluded from prompt context
    pub display_name: Option<String>,
    /// Avatar URL, excluded from prompt context
    pub avatar_url: Option<String>,
    /// Free-text background about the relationship
    pub relationship_background: Option<String>,
    /// Prioritized personality-trait ordering (most dominant first)
    pub color_profile: Option<String>,
    /// Comma-separated keywords describing the member
    pub keywords: Option<String>,
    /// Preferred love language
    pub love_language: Option<String>,
    /// Favorite shared activity
    pub favorite_activity: Option<String>,
    /// When the profile was created
    pub created_at: DateTimeUtc,
    /// When the profile was last edited
    pub updated_at: DateTimeUtc,
}

/// Profiles have no relations with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
