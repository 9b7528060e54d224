//! Migrate command - bootstraps the user schema and exits

use tracing::{info, warn};

use crate::infrastructure::storage::{connect, run_user_migrations, SqliteConfig};

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    if config.database.is_in_memory() {
        warn!("In-memory store configured; nothing to migrate");
        return Ok(());
    }

    let pool = connect(
        &SqliteConfig::new(&config.database.url).with_max_connections(config.database.max_connections),
    )
    .await?;

    let applied = run_user_migrations(&pool).await?;
    info!(applied, url = %config.database.url, "Migrations complete");

    pool.close().await;

    Ok(())
}
