//! # Database Migration System
//!
//! File-discovered schema migrations with version tracking, plus a
//! fresh-schema path for test databases guarded by a PostgreSQL advisory
//! lock so parallel test binaries do not race on schema initialization.
//!
//! Migrations live in `migrations/` and follow the
//! `YYYYMMDDHHMMSS_description.sql` naming convention.

use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Represents a single database migration file.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version timestamp (YYYYMMDDHHMMSS format)
    pub version: String,
    /// Human-readable migration name
    pub name: String,
    /// Full path to the SQL file
    pub path: PathBuf,
}

/// Manages database schema migrations with concurrency safety.
pub struct DatabaseMigrations;

impl DatabaseMigrations {
    /// Run all migrations in order
    pub async fn run_all(pool: &PgPool) -> Result<(), sqlx::Error> {
        let database_url = std::env::var("DATABASE_URL").unwrap_or_default();
        let is_test = database_url.contains("test");

        if is_test {
            // Test databases get a fresh schema under an advisory lock
            Self::run_fresh_schema_with_lock(pool).await?;
            return Ok(());
        }

        Self::ensure_migration_table(pool).await?;
        Self::run_outstanding_migrations(pool).await
    }

    /// Run fresh schema for tests, locked so only one thread initializes
    async fn run_fresh_schema_with_lock(pool: &PgPool) -> Result<(), sqlx::Error> {
        // Lock key: deterministic hash of "cardflow_test_schema_init"
        const LOCK_KEY: i64 = 7509231648240517;

        let lock_acquired = sqlx::query_scalar::<_, bool>("SELECT pg_try_advisory_lock($1)")
            .bind(LOCK_KEY)
            .fetch_one(pool)
            .await?;

        if lock_acquired {
            let result = Self::run_fresh_schema(pool).await;

            sqlx::query("SELECT pg_advisory_unlock($1)")
                .bind(LOCK_KEY)
                .execute(pool)
                .await?;

            result
        } else {
            Self::wait_for_schema_ready(pool).await
        }
    }

    /// Wait for another thread to finish initializing the schema
    async fn wait_for_schema_ready(pool: &PgPool) -> Result<(), sqlx::Error> {
        use tokio::time::{sleep, Duration};

        for _ in 0..60 {
            sleep(Duration::from_millis(500)).await;

            let schema_ready = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = 'cardflow_schema_migrations')"
            )
            .fetch_one(pool)
            .await?;

            if schema_ready {
                return Ok(());
            }
        }

        Err(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "Timeout waiting for schema initialization",
        )))
    }

    /// Drop and recreate everything, then apply all migrations
    async fn run_fresh_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(
            r#"
            DROP SCHEMA public CASCADE;
            CREATE SCHEMA public;
            GRANT ALL ON SCHEMA public TO PUBLIC;
        "#,
        )
        .execute(pool)
        .await?;

        Self::ensure_migration_table(pool).await?;

        let migrations = Self::discover_migrations()?;
        for migration in migrations.values() {
            Self::run_migration(pool, &migration.path.to_string_lossy()).await?;
            Self::record_migration(pool, &migration.version).await?;
        }

        Ok(())
    }

    /// Run only outstanding migrations (not already applied)
    async fn run_outstanding_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        let migrations = Self::discover_migrations()?;
        let applied_migrations = Self::get_applied_migrations(pool).await?;

        for migration in migrations.values() {
            if !applied_migrations.contains(&migration.version) {
                tracing::info!(
                    version = %migration.version,
                    name = %migration.name,
                    "Applying migration"
                );
                Self::run_migration(pool, &migration.path.to_string_lossy()).await?;
                Self::record_migration(pool, &migration.version).await?;
            }
        }

        Ok(())
    }

    /// Discover all migration files in the migrations directory
    fn discover_migrations() -> Result<BTreeMap<String, Migration>, sqlx::Error> {
        let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let migrations_dir = project_root.join("migrations");

        if !migrations_dir.exists() {
            return Ok(BTreeMap::new());
        }

        let mut migrations = BTreeMap::new();

        for entry in fs::read_dir(migrations_dir).map_err(sqlx::Error::Io)? {
            let entry = entry.map_err(sqlx::Error::Io)?;
            let path = entry.path();

            if path.is_file() && path.extension().map(|s| s == "sql").unwrap_or(false) {
                if let Some(filename) = path.file_stem().and_then(|s| s.to_str()) {
                    if let Some((version, name)) = Self::parse_migration_filename(filename) {
                        migrations.insert(version.clone(), Migration { version, name, path });
                    }
                }
            }
        }

        Ok(migrations)
    }

    /// Parse migration filename to extract version and name
    fn parse_migration_filename(filename: &str) -> Option<(String, String)> {
        // Expected format: YYYYMMDDHHMMSS_migration_name
        if filename.len() < 15 {
            return None;
        }

        let (version_part, name_part) = filename.split_at(14);

        if !version_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let name = if let Some(stripped) = name_part.strip_prefix('_') {
            stripped.replace('_', " ")
        } else {
            name_part.replace('_', " ")
        };

        Some((version_part.to_string(), name))
    }

    /// Ensure migration tracking table exists
    async fn ensure_migration_table(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS cardflow_schema_migrations (
                version VARCHAR(14) PRIMARY KEY,
                applied_at TIMESTAMP WITHOUT TIME ZONE DEFAULT NOW()
            )
        "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get list of applied migration versions
    async fn get_applied_migrations(
        pool: &PgPool,
    ) -> Result<std::collections::HashSet<String>, sqlx::Error> {
        let rows = sqlx::query("SELECT version FROM cardflow_schema_migrations")
            .fetch_all(pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>("version"))
            .collect())
    }

    /// Record that a migration has been applied
    async fn record_migration(pool: &PgPool, version: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO cardflow_schema_migrations (version) VALUES ($1)")
            .bind(version)
            .execute(pool)
            .await?;

        Ok(())
    }

    async fn run_migration(pool: &PgPool, migration_path: &str) -> Result<(), sqlx::Error> {
        if !Path::new(migration_path).exists() {
            tracing::warn!(path = %migration_path, "Migration file not found, skipping");
            return Ok(());
        }

        let sql = std::fs::read_to_string(migration_path).map_err(sqlx::Error::Io)?;

        sqlx::raw_sql(&sql).execute(pool).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_migration_filename() {
        let parsed = DatabaseMigrations::parse_migration_filename("20250801000001_create_core_tables");
        assert_eq!(
            parsed,
            Some(("20250801000001".to_string(), "create core tables".to_string()))
        );

        assert_eq!(DatabaseMigrations::parse_migration_filename("short"), None);
        assert_eq!(
            DatabaseMigrations::parse_migration_filename("notadigitprefix_name"),
            None
        );
    }
}
