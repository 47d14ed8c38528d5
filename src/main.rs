use dotenvy::dotenv;
use parquest_core::{
    api::{self, AppState},
    config,
    core::recommend::RecommendationService,
    errors::Result,
    llm::LlmClient,
};
use sea_orm::{EntityTrait, QuerySelect};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect to the database and create the schema on first run
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;

    let schema_exists = parquest_core::entities::Setting::find()
        .limit(1)
        .all(&db)
        .await
        .is_ok();
    if !schema_exists {
        config::database::create_tables(&db)
            .await
            .inspect(|_| info!("Database schema created."))
            .inspect_err(|e| error!("Failed to create schema: {}", e))?;
    }

    // 4. Seed XP rules, data sources, and settings (idempotent)
    let seed = config::seed::load_default_config()?;
    config::seed::seed_database(&db, &seed)
        .await
        .inspect_err(|e| error!("Failed to seed configuration: {}", e))?;

    // 5. Build the recommendation service
    // OPENAI_API_KEY is loaded here, directly before use
    let llm = LlmClient::from_env()
        .inspect_err(|e| error!("Completion client unavailable: {}", e))
        .map_err(parquest_core::errors::Error::Completion)?;
    let state = AppState::new(db, RecommendationService::new(llm));

    // 6. Serve the HTTP API
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);

    axum::serve(listener, api::router(state)).await?;

    Ok(())
}
