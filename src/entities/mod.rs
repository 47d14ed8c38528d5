//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod data_source;
pub mod gpt_log;
pub mod profile;
pub mod recommendation;
pub mod reward;
pub mod reward_log;
pub mod setting;
pub mod xp_rule;
pub mod xp_transaction;

// Re-export specific types to avoid conflicts
pub use data_source::{Column as DataSourceColumn, Entity as DataSource, Model as DataSourceModel};
pub use gpt_log::{Column as GptLogColumn, Entity as GptLog, Model as GptLogModel};
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};
pub use recommendation::{
    Column as RecommendationColumn, Entity as Recommendation, Model as RecommendationModel,
};
pub use reward::{Column as RewardColumn, Entity as Reward, Model as RewardModel};
pub use reward_log::{Column as RewardLogColumn, Entity as RewardLog, Model as RewardLogModel};
pub use setting::{Column as SettingColumn, Entity as Setting, Model as SettingModel};
pub use xp_rule::{Column as XpRuleColumn, Entity as XpRule, Model as XpRuleModel};
pub use xp_transaction::{
    Column as XpTransactionColumn, Entity as XpTransaction, Model as XpTransactionModel,
};
