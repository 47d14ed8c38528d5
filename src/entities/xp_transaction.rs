//! XP transaction entity - Represents every XP movement in the system.
//!
//! The ledger is append-only: rows are never updated or deleted, and a user's
//! balance is always the sum of `change` over their rows. Corrections are
//! written as new offsetting transactions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// XP transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "xp_transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Household member this transaction belongs to
    pub user_id: String,
    /// Role of the member at the time of the award (e.g. `"mads"`)
    pub role: String,
    /// Signed XP delta (positive for awards, negative for redemptions)
    pub change: i64,
    /// Human-readable reason, e.g. `"complete_parquiz: Love languages (low)"`
    pub description: String,
    /// When the transaction was written
    pub created_at: DateTimeUtc,
}

/// XP transactions have no relations; provenance lives in the description
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
