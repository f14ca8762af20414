use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::api::state::token_manager;
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(help = "User id to place in the subject claim")]
    pub user_id: Uuid,
    #[arg(help = "Display name claim")]
    pub name: String,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    // Signing needs only the security settings.
    let config = AppConfig::from_env_without_database()?;
    let tokens = token_manager(&config.security)?;
    let token = tokens.issue(args.user_id, &args.name)?;

    output_success(
        output_format,
        &format!("Token issued for {}", args.user_id),
        Some(json!({
            "token": token,
            "expires_in_hours": tokens.ttl().num_hours(),
        })),
    )
}
