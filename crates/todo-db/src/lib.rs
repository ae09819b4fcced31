//! # Todo DB
//!
//! PostgreSQL connection pool and schema migrations for the Todo API.
//!
//! # Example
//!
//! ```ignore
//! use todo_db::{init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&database_url).await?;
//! run_migrations(&pool).await?;
//! ```

use sqlx::postgres::PgPoolOptions;

pub use sqlx::PgPool;

const MAX_CONNECTIONS: u32 = 10;

/// Connects a PostgreSQL pool.
///
/// The returned pool is cheaply cloneable and should be created once at startup.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await?;

    tracing::info!(max_connections = MAX_CONNECTIONS, "Database pool initialized");
    Ok(pool)
}

/// Applies the migrations embedded from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
