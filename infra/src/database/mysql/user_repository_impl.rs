//! MySQL implementation of the UserRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sm_core::domain::entities::user::{User, UserRole};
use sm_core::errors::{AuthError, DomainError};
use sm_core::repositories::UserRepository;

use super::{db_error, is_unique_violation, parse_uuid};

const USER_COLUMNS: &str = "id, email, password_hash, display_name, role, email_verified, \
     oauth_subject, profile_picture, created_at, updated_at, last_login_at";

/// MySQL implementation of UserRepository
///
/// Emails are stored normalized; the unique key on `email` enforces
/// one account per address.
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    pub(crate) fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, DomainError> {
        let id: String = row.try_get("id").map_err(db_error("Failed to get id"))?;
        let role: String = row.try_get("role").map_err(db_error("Failed to get role"))?;

        Ok(User {
            id: parse_uuid(&id, "users.id")?,
            email: row.try_get("email").map_err(db_error("Failed to get email"))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(db_error("Failed to get password_hash"))?,
            display_name: row
                .try_get("display_name")
                .map_err(db_error("Failed to get display_name"))?,
            // Unknown roles degrade to the least privileged one
            role: role.parse().unwrap_or(UserRole::User),
            email_verified: row
                .try_get("email_verified")
                .map_err(db_error("Failed to get email_verified"))?,
            oauth_subject: row
                .try_get("oauth_subject")
                .map_err(db_error("Failed to get oauth_subject"))?,
            profile_picture: row
                .try_get("profile_picture")
                .map_err(db_error("Failed to get profile_picture"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_error("Failed to get created_at"))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(db_error("Failed to get updated_at"))?,
            last_login_at: row
                .try_get("last_login_at")
                .map_err(db_error("Failed to get last_login_at"))?,
        })
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, DomainError> {
        let query = format!(
            "SELECT {} FROM users WHERE {} = ? LIMIT 1",
            USER_COLUMNS, column
        );

        let result = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Database query failed"))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.find_one("id", &id.to_string()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.find_one("email", email).await
    }

    async fn find_by_oauth_subject(&self, subject: &str) -> Result<Option<User>, DomainError> {
        self.find_one("oauth_subject", subject).await
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            INSERT INTO users (
                id, email, password_hash, display_name, role, email_verified,
                oauth_subject, profile_picture, created_at, updated_at, last_login_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.display_name)
            .bind(user.role.as_str())
            .bind(user.email_verified)
            .bind(&user.oauth_subject)
            .bind(&user.profile_picture)
            .bind(user.created_at)
            .bind(user.updated_at)
            .bind(user.last_login_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(AuthError::UserAlreadyExists.into()),
            Err(e) => Err(db_error("Failed to create user")(e)),
        }
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            UPDATE users
            SET email = ?, password_hash = ?, display_name = ?, role = ?,
                email_verified = ?, oauth_subject = ?, profile_picture = ?,
                updated_at = ?, last_login_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.display_name)
            .bind(user.role.as_str())
            .bind(user.email_verified)
            .bind(&user.oauth_subject)
            .bind(&user.profile_picture)
            .bind(user.updated_at)
            .bind(user.last_login_at)
            .bind(user.id.to_string())
            .execute(&self.pool)
            .await;

        let result = match result {
            Ok(result) => result,
            Err(e) if is_unique_violation(&e) => return Err(AuthError::UserAlreadyExists.into()),
            Err(e) => return Err(db_error("Failed to update user")(e)),
        };

        // MySQL reports matched-but-unchanged rows as 0 affected
        if result.rows_affected() == 0 && self.find_by_id(user.id).await?.is_none() {
            return Err(DomainError::NotFound {
                resource: "User".to_string(),
            });
        }

        Ok(user)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?) AS found")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to check email existence"))?;

        let found: i64 = row
            .try_get("found")
            .map_err(db_error("Failed to get existence result"))?;
        Ok(found == 1)
    }
}
