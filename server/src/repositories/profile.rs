//! ProfileRepository - buyer preferences and wishlist

use super::{Read, RepoResult, Update};
use crate::dtos::UpdateProfileDTO;
use crate::entities::Profile;
use sqlx::SqlitePool;
use tracing::debug;

const PROFILE_COLUMNS: &str = "user_id, mobile_number, preferred_location, budget";

pub struct ProfileRepository {
    connection_pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Accounts created before profiles existed get an empty one on first access
    pub async fn get_or_create(&self, user_id: &i64) -> RepoResult<Profile> {
        sqlx::query("INSERT OR IGNORE INTO profiles (user_id) VALUES (?)")
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        self.read(user_id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Adds the property to the wishlist, or removes it if already there.
    /// Returns whether the property is now wishlisted.
    pub async fn toggle_wishlist(&self, user_id: &i64, property_id: &i64) -> RepoResult<bool> {
        let mut tx = self.connection_pool.begin().await?;

        let removed = sqlx::query("DELETE FROM wishlist WHERE user_id = ? AND property_id = ?")
            .bind(user_id)
            .bind(property_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            sqlx::query("INSERT INTO wishlist (user_id, property_id) VALUES (?, ?)")
                .bind(user_id)
                .bind(property_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!("Wishlist toggled for user {} on property {}", user_id, property_id);
        Ok(removed == 0)
    }

    pub async fn wishlist_ids(&self, user_id: &i64) -> RepoResult<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT property_id FROM wishlist WHERE user_id = ? ORDER BY property_id",
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Read<Profile, i64> for ProfileRepository {
    async fn read(&self, user_id: &i64) -> RepoResult<Option<Profile>> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<Profile, UpdateProfileDTO, i64> for ProfileRepository {
    async fn update(&self, user_id: &i64, data: &UpdateProfileDTO) -> RepoResult<Profile> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET mobile_number = ?, preferred_location = ?, budget = ?
            WHERE user_id = ?
            "#,
        )
        .bind(&data.mobile_number)
        .bind(&data.preferred_location)
        .bind(data.budget)
        .bind(user_id)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        self.read(user_id).await?.ok_or(sqlx::Error::RowNotFound)
    }
}
