//! Reward entity - Redeemable catalog items purchased with XP.
//!
//! Rewards are hard-deleted at redemption time; the audit trail lives in
//! `reward_log`, which survives the deletion.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reward database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rewards")]
pub struct Model {
    /// Unique identifier for the reward
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display title, e.g. `"Movie night"`
    pub title: String,
    /// XP balance required to redeem
    pub required_xp: i64,
}

/// Rewards have no relations with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
