use anyhow::Context;
use my_finance_api::api::{self, AppState};
use my_finance_api::config::AppConfig;
use my_finance_api::database::DatabaseManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DB_* and JWT_SECRET
    let _ = dotenvy::dotenv();
    my_finance_api::init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting Finance API in {:?} mode", config.environment);

    let db = DatabaseManager::connect(config.database()?)
        .await
        .context("failed to connect to database")?;
    let state = AppState::postgres(&db, &config.security)?;

    let result = api::serve(state, &config).await;
    db.close().await;
    result
}
