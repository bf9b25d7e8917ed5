//! UserRepository - accounts

use super::{Create, Read, ReadMany, RepoResult, Update};
use crate::dtos::{CreateUserDTO, UpdateUserDTO};
use crate::entities::User;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const USER_COLUMNS: &str =
    "user_id, email, password, first_name, last_name, role, created_at";

pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> UserRepository {
        Self { connection_pool }
    }

    /// Email is the login name and is unique (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
        ))
        .bind(email.trim())
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Identity check of the password reset: every field compared case-insensitively
    pub async fn find_by_identity(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE first_name = ? COLLATE NOCASE
              AND last_name = ? COLLATE NOCASE
              AND email = ? COLLATE NOCASE
            "#
        ))
        .bind(first_name.trim())
        .bind(last_name.trim())
        .bind(email.trim())
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// `password_hash` must already be hashed
    pub async fn update_password(&self, user_id: &i64, password_hash: &str) -> RepoResult<()> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE user_id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }
    /// Registration: the account and its profile are written together or not at all
    pub async fn create_with_profile(
        &self,
        data: &CreateUserDTO,
        mobile_number: Option<&str>,
        preferred_location: Option<&str>,
    ) -> RepoResult<User> {
        let mut tx = self.connection_pool.begin().await?;

        let user = Self::insert_user(&mut *tx, data).await?;
        sqlx::query(
            "INSERT INTO profiles (user_id, mobile_number, preferred_location) VALUES (?, ?, ?)",
        )
        .bind(user.user_id)
        .bind(mobile_number)
        .bind(preferred_location)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn insert_user(conn: &mut SqliteConnection, data: &CreateUserDTO) -> RepoResult<User> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password, first_name, last_name, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(data.email.trim())
        .bind(&data.password)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;

        Ok(User {
            user_id: result.last_insert_rowid(),
            email: data.email.trim().to_string(),
            password: data.password.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            role: data.role,
            created_at,
        })
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    async fn create(&self, data: &CreateUserDTO) -> RepoResult<User> {
        let mut conn = self.connection_pool.acquire().await?;
        Self::insert_user(&mut *conn, data).await
    }
}

impl Read<User, i64> for UserRepository {
    async fn read(&self, id: &i64) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl ReadMany<User, i64> for UserRepository {
    async fn read_many(&self, ids: &[i64]) -> RepoResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE user_id IN ("));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        query
            .build_query_as::<User>()
            .fetch_all(&self.connection_pool)
            .await
    }
}

impl Update<User, UpdateUserDTO, i64> for UserRepository {
    async fn update(&self, id: &i64, data: &UpdateUserDTO) -> RepoResult<User> {
        let current = self.read(id).await?.ok_or(sqlx::Error::RowNotFound)?;

        sqlx::query(
            "UPDATE users SET first_name = ?, last_name = ?, email = ? WHERE user_id = ?",
        )
        .bind(data.first_name.as_deref().unwrap_or(&current.first_name))
        .bind(data.last_name.as_deref().unwrap_or(&current.last_name))
        .bind(data.email.as_deref().map(str::trim).unwrap_or(&current.email))
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        self.read(id).await?.ok_or(sqlx::Error::RowNotFound)
    }
}
