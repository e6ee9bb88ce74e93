//! User repository implementation.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use complyhub_core::error::AppError;
use complyhub_core::result::AppResult;
use complyhub_entity::user::{CreateUser, UpdateProfile, User};

use super::{db_error, violated_constraint};

/// Repository for user CRUD and session-token bookkeeping.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    /// Find a user by username. Usernames are stored lowercase.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by username"))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by email"))
    }

    /// Find a user whose username or email equals `identifier`.
    pub async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE username = LOWER($1) OR LOWER(email) = LOWER($1) LIMIT 1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find user by identifier"))
    }

    /// List every user, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list users"))
    }

    /// Create a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("Failed to acquire connection"))?;
        insert_user(&mut conn, data).await
    }

    /// Update whitelisted profile fields.
    pub async fn update_profile(&self, id: Uuid, data: &UpdateProfile) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone_number = COALESCE($4, phone_number),
                avatar = COALESCE($5, avatar),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.phone_number)
        .bind(&data.avatar)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update user profile"))?
        .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Record a successful login and store the new refresh token id.
    pub async fn record_login(&self, id: Uuid, refresh_token_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET last_login_at = NOW(), refresh_token_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(refresh_token_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to record login"))?;
        Ok(())
    }

    /// Replace the stored refresh token id only if it still equals
    /// `expected`. Returns `false` when another exchange won the race or the
    /// presented token was already rotated away.
    pub async fn rotate_refresh_token(
        &self,
        id: Uuid,
        expected: Uuid,
        replacement: Uuid,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token_id = $3, updated_at = NOW() WHERE id = $1 AND refresh_token_id = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(replacement)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to rotate refresh token"))?;
        Ok(result.rows_affected() == 1)
    }

    /// Forget the stored refresh token id (logout).
    pub async fn clear_refresh_token(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET refresh_token_id = NULL, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to clear refresh token"))?;
        Ok(())
    }

    /// Persist the active organization/team together with a freshly issued
    /// refresh token id.
    pub async fn set_active_context(
        &self,
        id: Uuid,
        organization_id: Option<Uuid>,
        team_id: Option<Uuid>,
        refresh_token_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            r#"UPDATE users SET
                active_organization_id = $2,
                active_team_id = $3,
                refresh_token_id = $4,
                updated_at = NOW()
            WHERE id = $1"#,
        )
        .bind(id)
        .bind(organization_id)
        .bind(team_id)
        .bind(refresh_token_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to set active context"))?;
        Ok(())
    }

    /// Delete a user. Memberships go with it; content they created blocks
    /// the delete.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::bad_request("User still owns organizations, folders or documents")
                }
                other => db_error("Failed to delete user")(other),
            })?;
        Ok(result.rows_affected() > 0)
    }
}

/// Insert a user on an existing connection so callers can put it inside a
/// larger transaction.
pub(crate) async fn insert_user(conn: &mut PgConnection, data: &CreateUser) -> AppResult<User> {
    sqlx::query_as::<_, User>(
        r#"INSERT INTO users
            (id, username, email, password_hash, first_name, last_name, phone_number, site_roles)
        VALUES ($1, LOWER($2), $3, $4, $5, $6, $7, $8)
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(&data.username)
    .bind(&data.email)
    .bind(&data.password_hash)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.phone_number)
    .bind(&data.site_roles)
    .fetch_one(conn)
    .await
    .map_err(|e| match violated_constraint(&e) {
        Some("users_email_key") => AppError::bad_request("Email already exists"),
        Some("users_username_key") => AppError::bad_request("Username already exists"),
        _ => db_error("Failed to create user")(e),
    })
}
