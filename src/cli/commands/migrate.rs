use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let db = DatabaseManager::connect(config.database()?).await?;
    db.migrate().await?;
    db.close().await;

    output_success(
        output_format,
        "Migrations applied",
        Some(json!({ "environment": format!("{:?}", config.environment) })),
    )
}
