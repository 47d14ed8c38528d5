//! Fail-soft settings lookups.
//!
//! Configuration rows (level length, default completion model) may be absent
//! or malformed; the core then falls back to documented defaults instead of
//! failing. The fallback is made explicit through [`Lookup`] so callers and
//! tests can distinguish "used fallback" from "found configured value".

use crate::{
    entities::{Setting, setting},
    errors::Result,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::debug;

/// XP quantum defining one level's worth of progress, used when the
/// `level_length` setting is absent or non-numeric.
pub const DEFAULT_LEVEL_LENGTH: i64 = 100;

/// Completion model used when the `default_model` setting is absent.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Result of a fail-soft configuration lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The configured value was found and used
    Found(T),
    /// No usable configured value; the documented default applies
    Defaulted(T),
}

impl<T> Lookup<T> {
    /// Returns the effective value, configured or defaulted.
    pub fn value(&self) -> &T {
        match self {
            Self::Found(value) | Self::Defaulted(value) => value,
        }
    }

    /// Consumes the lookup, returning the effective value.
    pub fn into_value(self) -> T {
        match self {
            Self::Found(value) | Self::Defaulted(value) => value,
        }
    }

    /// True when the default was applied.
    pub const fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted(_))
    }
}

/// Fetches a raw setting value by key.
pub async fn get_setting(db: &DatabaseConnection, key: &str) -> Result<Option<String>> {
    Ok(Setting::find()
        .filter(setting::Column::Key.eq(key))
        .one(db)
        .await?
        .map(|row| row.value))
}

/// Fetches the level length, falling back to [`DEFAULT_LEVEL_LENGTH`] when
/// the setting is absent, non-numeric, or non-positive.
pub async fn level_length(db: &DatabaseConnection) -> Result<Lookup<i64>> {
    match get_setting(db, "level_length").await? {
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(length) if length > 0 => Ok(Lookup::Found(length)),
            _ => {
                debug!(%raw, "level_length setting is not a positive integer, using default");
                Ok(Lookup::Defaulted(DEFAULT_LEVEL_LENGTH))
            }
        },
        None => Ok(Lookup::Defaulted(DEFAULT_LEVEL_LENGTH)),
    }
}

/// Fetches the default completion model, falling back to [`DEFAULT_MODEL`].
pub async fn default_model(db: &DatabaseConnection) -> Result<Lookup<String>> {
    match get_setting(db, "default_model").await? {
        Some(model) if !model.trim().is_empty() => Ok(Lookup::Found(model)),
        _ => Ok(Lookup::Defaulted(DEFAULT_MODEL.to_string())),
    }
}
