//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test
//! databases and creating test entities with sensible defaults.

use crate::{
    api::AppState,
    core::recommend::RecommendationService,
    entities::{data_source, profile, setting, xp_rule},
    errors::Result,
    llm::LlmClient,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds handler state over a fresh in-memory database. The completion
/// client points at the real endpoint with a dummy key; tests that hit the
/// completion path build their own state via [`spawn_one_shot_http`].
pub async fn setup_test_state() -> Result<AppState> {
    let db = setup_test_db().await?;
    let llm = LlmClient::new("test-key".to_string())?;
    Ok(AppState::new(db, RecommendationService::new(llm)))
}

/// Serves one canned 200 JSON response on an ephemeral local port and
/// returns the URL to point a completion client at. The listener task
/// exits after the first request.
pub async fn spawn_one_shot_http(body: &'static str) -> Result<String> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 8192];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len(),
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    Ok(format!("http://{addr}/v1/chat/completions"))
}

/// Inserts a setting row.
pub async fn set_setting(db: &DatabaseConnection, key: &str, value: &str) -> Result<()> {
    setting::ActiveModel {
        key: Set(key.to_string()),
        value: Set(value.to_string()),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Creates an XP rule for `(role, action, effort)` with the given delta.
pub async fn create_test_rule(
    db: &DatabaseConnection,
    role: &str,
    action: &str,
    effort: Option<&str>,
    xp: i64,
) -> Result<xp_rule::Model> {
    xp_rule::ActiveModel {
        role: Set(role.to_string()),
        action: Set(action.to_string()),
        effort: Set(effort.map(ToString::to_string)),
        xp: Set(xp),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a data source descriptor.
pub async fn create_test_source(
    db: &DatabaseConnection,
    table_name: &str,
    description: &str,
    enabled: bool,
    priority: i64,
) -> Result<data_source::Model> {
    data_source::ActiveModel {
        table_name: Set(table_name.to_string()),
        description: Set(description.to_string()),
        enabled: Set(enabled),
        priority: Set(priority),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a profile with filled-in personality fields and an empty
/// `favorite_activity`, so exclusion behavior is observable.
pub async fn create_test_profile(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<profile::Model> {
    let now = chrono::Utc::now();
    profile::ActiveModel {
        user_id: Set(user_id.to_string()),
        partner_id: Set(Some("sofie".to_string())),
        display_name: Set(Some("Mads".to_string())),
        avatar_url: Set(Some("https://example.test/avatar.png".to_string())),
        relationship_background: Set(Some("Together five years".to_string())),
        color_profile: Set(Some("red, yellow, green, blue".to_string())),
        keywords: Set(Some("spontaneous, warm".to_string())),
        love_language: Set(Some("Quality time".to_string())),
        favorite_activity: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}
