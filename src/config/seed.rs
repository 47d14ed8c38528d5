//! Seed configuration loading from config.toml
//!
//! Loads the initial XP rules, data source descriptors, and settings from a
//! TOML file and writes them into the database on first run. Seeding is
//! idempotent: rows that already exist (by their natural key) are left
//! untouched, so administrator edits survive restarts.

use crate::{
    entities::{
        DataSource, Setting, XpRule, data_source, setting, xp_rule,
    },
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct SeedConfig {
    /// XP rules to seed
    #[serde(default)]
    pub xp_rules: Vec<XpRuleSeed>,
    /// Data source descriptors to seed
    #[serde(default)]
    pub data_sources: Vec<DataSourceSeed>,
    /// Settings (key/value) to seed
    #[serde(default)]
    pub settings: Vec<SettingSeed>,
}

/// Seed definition for a single XP rule
#[derive(Debug, Deserialize, Clone)]
pub struct XpRuleSeed {
    /// Role the rule applies to
    pub role: String,
    /// Action being rewarded
    pub action: String,
    /// Optional effort tag
    pub effort: Option<String>,
    /// XP delta for a match
    pub xp: i64,
}

/// Seed definition for a single data source descriptor
#[derive(Debug, Deserialize, Clone)]
pub struct DataSourceSeed {
    /// Table to read context rows from
    pub table_name: String,
    /// Description included in the prompt block
    pub description: String,
    /// Whether the source participates in gathering
    pub enabled: bool,
    /// Ascending read order
    pub priority: i64,
}

/// Seed definition for a single setting
#[derive(Debug, Deserialize, Clone)]
pub struct SettingSeed {
    /// Setting key (e.g. `"level_length"`)
    pub key: String,
    /// Setting value as a string
    pub value: String,
}

/// Loads seed configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or required fields are missing.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads seed configuration from the default location (./config.toml).
/// A missing file is not an error; seeding is simply skipped.
pub fn load_default_config() -> Result<SeedConfig> {
    if !Path::new("config.toml").exists() {
        info!("No config.toml found, skipping seed configuration");
        return Ok(SeedConfig::default());
    }
    load_config("config.toml")
}

/// Seeds the database from the given configuration.
///
/// Rules are keyed by `(role, action, effort)`, sources by `table_name`,
/// settings by `key`; existing rows are never overwritten.
pub async fn seed_database(db: &DatabaseConnection, config: &SeedConfig) -> Result<()> {
    let mut inserted = 0usize;

    for rule in &config.xp_rules {
        let mut query = XpRule::find()
            .filter(xp_rule::Column::Role.eq(&rule.role))
            .filter(xp_rule::Column::Action.eq(&rule.action));
        query = match &rule.effort {
            Some(effort) => query.filter(xp_rule::Column::Effort.eq(effort)),
            None => query.filter(xp_rule::Column::Effort.is_null()),
        };

        if query.one(db).await?.is_none() {
            xp_rule::ActiveModel {
                role: Set(rule.role.clone()),
                action: Set(rule.action.clone()),
                effort: Set(rule.effort.clone()),
                xp: Set(rule.xp),
                ..Default::default()
            }
            .insert(db)
            .await?;
            inserted += 1;
        }
    }

    for source in &config.data_sources {
        let existing = DataSource::find()
            .filter(data_source::Column::TableName.eq(&source.table_name))
            .one(db)
            .await?;

        if existing.is_none() {
            data_source::ActiveModel {
                table_name: Set(source.table_name.clone()),
                description: Set(source.description.clone()),
                enabled: Set(source.enabled),
                priority: Set(source.priority),
                ..Default::default()
            }
            .insert(db)
            .await?;
            inserted += 1;
        }
    }

    for entry in &config.settings {
        let existing = Setting::find()
            .filter(setting::Column::Key.eq(&entry.key))
            .one(db)
            .await?;

        if existing.is_none() {
            setting::ActiveModel {
                key: Set(entry.key.clone()),
                value: Set(entry.value.clone()),
                updated_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            inserted += 1;
        }
    }

    info!(inserted, "Seed configuration applied");
    Ok(())
}
