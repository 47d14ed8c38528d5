//! Context gathering for recommendation generation.
//!
//! Pulls rows from the administrator-configured data sources in ascending
//! priority order, capped per table, and renders them into labeled text
//! blocks for the prompt. Separately renders the requesting user's profile
//! as a key/value block, excluding identity fields and empty values so the
//! model sees bounded, labeled, de-noised context.

use crate::{
    entities::{DataSource, Profile, data_source, profile},
    errors::Result,
};
use sea_orm::{FromQueryResult, JsonValue, QueryOrder, Statement, prelude::*};
use tracing::warn;

/// Maximum rows fetched from a single source table
pub const SOURCE_ROW_CAP: u64 = 50;

/// Profile fields never rendered into prompt context
const EXCLUDED_PROFILE_FIELDS: [&str; 7] = [
    "id",
    "user_id",
    "partner_id",
    "created_at",
    "updated_at",
    "avatar_url",
    "display_name",
];

/// Everything the gatherer assembled for one generation call.
#[derive(Debug, Clone, Default)]
pub struct GatheredContext {
    /// Labeled key/value rendering of the user's profile (may be empty)
    pub profile_block: String,
    /// Concatenated per-source text blocks (may be empty)
    pub data_block: String,
    /// Number of tables that actually contributed rows
    pub table_count: i64,
    /// Total rows across contributing tables
    pub row_count: i64,
    /// Names of the contributing tables, in gathering order
    pub tables_used: Vec<String>,
}

/// Humanizes a snake_case field name: underscores become spaces and each
/// word's first letter is capitalized.
#[must_use]
pub fn humanize_field(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Accepts only plain identifiers as table names. Source descriptors are
/// administrator rows, but they end up interpolated into SQL, so anything
/// that is not `[A-Za-z_][A-Za-z0-9_]*` is refused.
#[must_use]
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Renders a profile row into labeled `Key: value` lines, excluding
/// identity/internal fields and null/empty values.
#[must_use]
pub fn render_profile_block(profile: &profile::Model) -> String {
    let Ok(JsonValue::Object(fields)) = serde_json::to_value(profile) else {
        return String::new();
    };

    let mut lines = Vec::new();
    for (name, value) in &fields {
        if EXCLUDED_PROFILE_FIELDS.contains(&name.as_str()) {
            continue;
        }
        let rendered = match value {
            JsonValue::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            JsonValue::Number(n) => n.to_string(),
            JsonValue::Bool(b) => b.to_string(),
            _ => continue,
        };
        lines.push(format!("{}: {rendered}", humanize_field(name)));
    }

    lines.join("\n")
}

/// Fetches the user's profile row, if one exists.
pub async fn fetch_profile(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Option<profile::Model>> {
    Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the enabled source descriptors in ascending priority order.
pub async fn enabled_sources(db: &DatabaseConnection) -> Result<Vec<data_source::Model>> {
    DataSource::find()
        .filter(data_source::Column::Enabled.eq(true))
        .order_by_asc(data_source::Column::Priority)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches up to [`SOURCE_ROW_CAP`] rows from a source table as JSON values.
async fn fetch_source_rows(db: &DatabaseConnection, table_name: &str) -> Result<Vec<JsonValue>> {
    let statement = Statement::from_string(
        db.get_database_backend(),
        format!(r#"SELECT * FROM "{table_name}" LIMIT {SOURCE_ROW_CAP}"#),
    );

    JsonValue::find_by_statement(statement)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Gathers the full context for one generation call.
///
/// Sources with zero rows contribute nothing; a user without a profile row
/// yields an empty profile block. Zero enabled sources is not an error -
/// generation proceeds on an empty data block.
pub async fn gather(db: &DatabaseConnection, user_id: &str) -> Result<GatheredContext> {
    let profile_block = fetch_profile(db, user_id)
        .await?
        .map(|p| render_profile_block(&p))
        .unwrap_or_default();

    let mut data_blocks = Vec::new();
    let mut row_count = 0i64;
    let mut tables_used = Vec::new();

    for source in enabled_sources(db).await? {
        if !is_valid_table_name(&source.table_name) {
            warn!(table = %source.table_name, "Skipping source with invalid table name");
            continue;
        }

        let rows = fetch_source_rows(db, &source.table_name).await?;
        if rows.is_empty() {
            continue;
        }

        let dump = serde_json::to_string_pretty(&rows).unwrap_or_default();
        data_blocks.push(format!(
            "### {} - {}\n{dump}",
            source.table_name, source.description
        ));
        row_count += i64::try_from(rows.len()).unwrap_or(i64::MAX);
        tables_used.push(source.table_name);
    }

    Ok(GatheredContext {
        profile_block,
        data_block: data_blocks.join("\n\n"),
        table_count: i64::try_from(tables_used.len()).unwrap_or(i64::MAX),
        row_count,
        tables_used,
    })
}
