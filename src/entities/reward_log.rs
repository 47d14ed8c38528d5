//! Reward log entity - Immutable audit record of every redemption.
//!
//! Written at redemption time, independently of the reward row's deletion,
//! so redeemed rewards remain visible in history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reward log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reward_log")]
pub struct Model {
    /// Unique identifier for the log entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Title of the redeemed reward at redemption time
    pub title: String,
    /// XP cost that was debited
    pub required_xp: i64,
    /// When the redemption happened
    pub redeemed_at: DateTimeUtc,
}

/// Log entries have no relations with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
