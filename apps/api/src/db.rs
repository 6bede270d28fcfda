use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Interaction writes are one INSERT each; a small pool is plenty.
const MAX_CONNECTIONS: u32 = 5;

/// Start-up gives up on an unreachable store quickly and runs without it.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connects the interaction store and brings the `documents` table up to date.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .context("connecting to the interaction store")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("migrating the interaction store")?;

    info!("Interaction store ready ({MAX_CONNECTIONS} connections)");
    Ok(pool)
}
