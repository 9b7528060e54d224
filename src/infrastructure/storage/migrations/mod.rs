//! Database schema migrations

use sqlx::sqlite::SqlitePool;
use tracing::info;

use crate::domain::DomainError;

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version, applied in ascending order
    pub version: i64,
    /// Human-readable description
    pub description: String,
    /// Single SQL statement to run when applying the migration
    pub up: String,
}

impl Migration {
    pub fn new(version: i64, description: impl Into<String>, up: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
        }
    }
}

/// Migrations for the accounts schema
pub fn user_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                phone TEXT NOT NULL DEFAULT '',
                member_code TEXT NOT NULL,
                membership_level TEXT NOT NULL,
                points INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        ),
        Migration::new(
            2,
            "Index users by member code",
            "CREATE INDEX IF NOT EXISTS idx_users_member_code ON users (member_code)",
        ),
    ]
}

/// SQLite migrator tracking applied versions in `_migrations`
#[derive(Debug, Clone)]
pub struct SqliteMigrator {
    pool: SqlitePool,
}

impl SqliteMigrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Runs a single migration unless it was already applied
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        let applied: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM _migrations WHERE version = ?")
                .bind(migration.version)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to check migration status: {}", e))
                })?;

        if applied > 0 {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin migration: {}", e)))?;

        sqlx::query(&migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES (?, ?)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit migration: {}", e)))?;

        Ok(true)
    }

    /// Applies every pending migration in version order
    pub async fn run(&self, migrations: &[Migration]) -> Result<usize, DomainError> {
        let mut ordered: Vec<&Migration> = migrations.iter().collect();
        ordered.sort_by_key(|m| m.version);

        let mut applied = 0;

        for migration in ordered {
            if self.run_migration(migration).await? {
                info!(
                    version = migration.version,
                    description = %migration.description,
                    "Applied migration"
                );
                applied += 1;
            }
        }

        Ok(applied)
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))?;

        Ok(version)
    }
}

/// Bring the accounts schema up to date
pub async fn run_user_migrations(pool: &SqlitePool) -> Result<usize, DomainError> {
    SqliteMigrator::new(pool.clone()).run(&user_migrations()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::{connect, SqliteConfig};

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = connect(&SqliteConfig::in_memory()).await.unwrap();

        let first = run_user_migrations(&pool).await.unwrap();
        let second = run_user_migrations(&pool).await.unwrap();

        assert_eq!(first, user_migrations().len());
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn test_current_version() {
        let pool = connect(&SqliteConfig::in_memory()).await.unwrap();
        let migrator = SqliteMigrator::new(pool.clone());

        assert_eq!(migrator.current_version().await.unwrap(), None);

        run_user_migrations(&pool).await.unwrap();
        assert_eq!(migrator.current_version().await.unwrap(), Some(2));
    }
}
