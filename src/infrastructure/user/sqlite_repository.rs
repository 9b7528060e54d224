//! SQLite user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::domain::user::{Membership, NewUser, Profile, User, UserId, UserRepository};
use crate::domain::DomainError;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone, \
                            member_code, membership_level, points, created_at, updated_at";

/// SQLite implementation of UserRepository
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, member_code, membership_level, points,
                               created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.membership.member_code)
        .bind(&user.membership.level)
        .bind(user.membership.points)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DomainError::conflict(format!("Email '{}' already exists", user.email))
            }
            _ => DomainError::storage(format!("Failed to create user: {}", e)),
        })?;

        let id = u64::try_from(result.last_insert_rowid())
            .map_err(|e| DomainError::storage(format!("Invalid row id: {}", e)))?;

        Ok(User::restore(
            UserId::new(id),
            user.email,
            user.password_hash,
            Profile::default(),
            user.membership,
            now,
            now,
        ))
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let membership = user.membership();
        let profile = user.profile();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = ?, password_hash = ?, first_name = ?, last_name = ?, phone = ?,
                member_code = ?, membership_level = ?, points = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(user.email())
        .bind(user.password_hash())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.phone)
        .bind(&membership.member_code)
        .bind(&membership.level)
        .bind(membership.points)
        .bind(user.updated_at())
        .bind(id_to_i64(user.id())?)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DomainError::conflict(format!("Email '{}' already exists", user.email()))
            }
            _ => DomainError::storage(format!("Failed to update user: {}", e)),
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User '{}' not found", user.id())));
        }

        Ok(user.clone())
    }
}

fn id_to_i64(id: UserId) -> Result<i64, DomainError> {
    i64::try_from(id.get())
        .map_err(|_| DomainError::storage(format!("User id {} exceeds the SQLite range", id)))
}

fn row_to_user(row: &SqliteRow) -> Result<User, DomainError> {
    let column_error = |e: sqlx::Error| DomainError::storage(format!("Invalid user row: {}", e));

    let id: i64 = row.try_get("id").map_err(column_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(column_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(column_error)?;

    let profile = Profile {
        first_name: row.try_get("first_name").map_err(column_error)?,
        last_name: row.try_get("last_name").map_err(column_error)?,
        phone: row.try_get("phone").map_err(column_error)?,
    };

    let membership = Membership {
        member_code: row.try_get("member_code").map_err(column_error)?,
        level: row.try_get("membership_level").map_err(column_error)?,
        points: row.try_get("points").map_err(column_error)?,
    };

    let id = u64::try_from(id)
        .map_err(|_| DomainError::storage(format!("Negative user id {} in database", id)))?;

    Ok(User::restore(
        UserId::new(id),
        row.try_get::<String, _>("email").map_err(column_error)?,
        row.try_get::<String, _>("password_hash").map_err(column_error)?,
        profile,
        membership,
        created_at,
        updated_at,
    ))
}
