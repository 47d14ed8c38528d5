/// Database configuration and connection management
pub mod database;

/// Seed data loading (XP rules, data sources, settings) from config.toml
pub mod seed;
