use clap::Args;

use crate::api::{self, AppState};
use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore};

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Keep all data in process memory instead of PostgreSQL")]
    pub in_memory: bool,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = if args.in_memory {
        AppConfig::from_env_without_database()?
    } else {
        AppConfig::from_env()?
    };
    tracing::info!("Starting Finance API in {:?} mode", config.environment);

    if args.in_memory {
        tracing::warn!("Using the in-memory store; data is lost on exit");
        let state = AppState::in_memory(MemoryStore::new(), &config.security)?;
        return api::serve(state, &config).await;
    }

    let db = DatabaseManager::connect(config.database()?).await?;
    let state = AppState::postgres(&db, &config.security)?;
    let result = api::serve(state, &config).await;
    db.close().await;
    result
}
