//! Database configuration module.
//!
//! Handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions via
//! `Schema::create_table_from_entity`, so the database schema always matches
//! the Rust struct definitions without manual SQL.

use crate::entities::{
    DataSource, GptLog, Profile, Recommendation, Reward, RewardLog, Setting, XpRule, XpTransaction,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/parquest.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL`
/// environment variable, falling back to a default local `SQLite` file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables from the entity definitions.
///
/// Safe to call on a fresh database only; existing installations keep their
/// schema. Covers the ledger, rule/reward catalog, gathering configuration,
/// generation audit tables, profiles, and settings.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let statements = [
        schema.create_table_from_entity(XpTransaction),
        schema.create_table_from_entity(XpRule),
        schema.create_table_from_entity(Reward),
        schema.create_table_from_entity(RewardLog),
        schema.create_table_from_entity(DataSource),
        schema.create_table_from_entity(GptLog),
        schema.create_table_from_entity(Recommendation),
        schema.create_table_from_entity(Profile),
        schema.create_table_from_entity(Setting),
    ];

    for statement in &statements {
        db.execute(builder.build(statement)).await?;
    }

    Ok(())
}
