// Database connection for the load phase

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use dengue_common::{EtlError, Result};

/// Create the connection pool for the load phase
///
/// The whole load runs on one connection inside one transaction, so the
/// pool is capped at a single connection. Connecting eagerly surfaces an
/// unreachable database before any table is touched.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.connection_url())
        .await
        .map_err(|e| EtlError::Load(format!("Database connection failed: {}", e)))?;

    info!(
        host = %config.host,
        database = %config.database,
        "Database connection established"
    );

    Ok(pool)
}
