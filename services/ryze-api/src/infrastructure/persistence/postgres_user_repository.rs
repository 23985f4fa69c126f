//! PostgreSQL 用户 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ryze_adapter_postgres::map_db_error;
use ryze_common::UserId;
use ryze_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{User, UserType};
use crate::domain::repositories::UserRepository;
use crate::domain::value_objects::{Email, HashedPassword, Username};

const USER_COLUMNS: &str = "id, username, email, full_name, password_hash, user_type, \
                            is_active, is_admin, terms_accepted, created_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "user"))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "user"))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ANY($1)",
            USER_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "user"))?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, full_name, password_hash, user_type,
                               is_active, is_admin, terms_accepted, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.full_name)
        .bind(user.password_hash.as_str())
        .bind(user.user_type.as_str())
        .bind(user.is_active)
        .bind(user.is_admin)
        .bind(user.terms_accepted)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "User"))?;

        Ok(())
    }

    async fn exists_by_username(&self, username: &Username) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to check username: {}", e)))?;

        Ok(result.0)
    }

    async fn exists_by_email(&self, email: &Email) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check email: {}", e)))?;

        Ok(result.0)
    }

    async fn search_by_username(
        &self,
        query: &str,
        exclude: &UserId,
        limit: i64,
    ) -> AppResult<Vec<User>> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE LOWER(username) LIKE $1 ESCAPE '\\' AND id <> $2 \
             ORDER BY username LIMIT $3",
            USER_COLUMNS
        ))
        .bind(pattern)
        .bind(exclude.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "user"))?;

        rows.into_iter().map(UserRow::into_user).collect()
    }
}

/// 转义 LIKE 通配符
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    full_name: String,
    password_hash: String,
    user_type: String,
    is_active: bool,
    is_admin: bool,
    terms_accepted: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AppResult<User> {
        let user_type: UserType = self.user_type.parse().map_err(|_| {
            AppError::database(format!(
                "Invalid user_type '{}' in database for user {}",
                self.user_type, self.id
            ))
        })?;

        Ok(User {
            id: UserId::from_uuid(self.id),
            username: Username::from_trusted(self.username),
            email: Email::from_trusted(self.email),
            full_name: self.full_name,
            password_hash: HashedPassword::from_hash(self.password_hash),
            user_type,
            is_active: self.is_active,
            is_admin: self.is_admin,
            terms_accepted: self.terms_accepted,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a_b%c"), "a\\_b\\%c");
        assert_eq!(escape_like("plain"), "plain");
    }
}
