//! XP rule entity - Administrator-tuned award configuration.
//!
//! Each rule maps an `(action, effort, role)` triple to an XP delta. The core
//! treats this table as read-only; an administrative surface outside this
//! crate edits it. A lookup that does not resolve to exactly one rule makes
//! the award a logged no-op rather than an error.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// XP rule database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "xp_rules")]
pub struct Model {
    /// Unique identifier for the rule
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Role the rule applies to
    pub role: String,
    /// Action being rewarded (e.g. `"complete_parquiz"`)
    pub action: String,
    /// Optional effort tag modulating the award (`"low"`/`"medium"`/`"high"`)
    pub effort: Option<String>,
    /// XP delta granted when the rule matches
    pub xp: i64,
}

/// Rules have no relations with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
