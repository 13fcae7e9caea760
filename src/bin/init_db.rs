//! Destructively recreates every table. One-time setup, not a migration tool.

use anyhow::Context;
use hospital::{
    config::AppConfig,
    db::{self, Db, RetryPolicy},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    hospital::init_tracing();

    let config = AppConfig::from_env()?;
    let retry = RetryPolicy::fixed(config.retry.max_attempts, config.retry.delay());
    let db = Db::connect(&config.database_url, 1, retry).await?;

    db::reset_schema(&db)
        .await
        .with_context(|| format!("reset schema of {}", config.database_url))?;
    tracing::info!(database = %config.database_url, "tables created");
    Ok(())
}
