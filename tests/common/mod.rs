//! Shared helpers for database-backed integration tests.

use sqlx::PgPool;
use tokio::sync::OnceCell;

use cardflow_core::database::DatabaseMigrations;

static SCHEMA_READY: OnceCell<()> = OnceCell::const_new();

/// Connect to the test database and make sure the schema is in place.
///
/// Migrations run once per test process; the migration runner itself holds a
/// database advisory lock against other processes.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for database integration tests");
    let pool = PgPool::connect(&url).await.expect("Failed to connect to database");

    SCHEMA_READY
        .get_or_init(|| async {
            DatabaseMigrations::run_all(&pool)
                .await
                .expect("Failed to run migrations");
        })
        .await;

    pool
}

/// A unique employee code so tests do not collide on the code's unique index
pub fn unique_code(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &suffix[..8].to_uppercase())
}
