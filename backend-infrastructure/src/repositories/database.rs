use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use backend_domain::DbConfig;

/// Opens the pool and applies embedded migrations.
pub async fn connect(config: &DbConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections.max(1));
    if is_memory_url(&config.database_url) {
        // Every in-memory connection is its own database; pin a single one.
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    let pool = pool_options.connect_with(options).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database ready at {}", config.database_url);
    Ok(pool)
}

/// Fresh migrated in-memory database, used by tests across the workspace.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    connect(&DbConfig {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
