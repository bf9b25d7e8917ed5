//! PropertyRepository - listings and their galleries

use super::{Create, Delete, Read, RepoResult, Update};
use crate::dtos::{CreatePropertyDTO, PropertyFormDTO};
use crate::entities::{Property, PropertyImage, PropertyType};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const PROPERTY_COLUMNS: &str = r#"
    property_id, seller_id, title, description, price, property_type, status,
    bedrooms, bathrooms, area_sqft, location, facing, main_image, is_published, list_date
"#;

pub struct PropertyRepository {
    connection_pool: SqlitePool,
}

impl PropertyRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Published listings, newest first, optionally of one type only
    pub async fn find_published(&self, property_type: Option<PropertyType>) -> RepoResult<Vec<Property>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE is_published = 1"
        ));
        if let Some(kind) = property_type {
            query.push(" AND property_type = ").push_bind(kind);
        }
        query.push(" ORDER BY list_date DESC, property_id DESC");

        query
            .build_query_as::<Property>()
            .fetch_all(&self.connection_pool)
            .await
    }

    /// The `limit` most recently listed published properties of a type
    pub async fn find_latest_published(
        &self,
        property_type: PropertyType,
        limit: i64,
    ) -> RepoResult<Vec<Property>> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS} FROM properties
            WHERE is_published = 1 AND property_type = ?
            ORDER BY list_date DESC, property_id DESC
            LIMIT ?
            "#
        ))
        .bind(property_type)
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// The `limit` most expensive published properties of a type
    pub async fn find_top_priced(
        &self,
        property_type: PropertyType,
        limit: i64,
    ) -> RepoResult<Vec<Property>> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS} FROM properties
            WHERE is_published = 1 AND property_type = ?
            ORDER BY price DESC, property_id DESC
            LIMIT ?
            "#
        ))
        .bind(property_type)
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Highest-priced published house, featured on the home page
    pub async fn find_showcase(&self) -> RepoResult<Option<Property>> {
        Ok(self
            .find_top_priced(PropertyType::House, 1)
            .await?
            .into_iter()
            .next())
    }

    pub async fn find_published_by_id(&self, property_id: &i64) -> RepoResult<Option<Property>> {
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE property_id = ? AND is_published = 1"
        ))
        .bind(property_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Seller dashboard, newest first
    pub async fn find_by_seller(&self, seller_id: &i64) -> RepoResult<Vec<Property>> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS} FROM properties
            WHERE seller_id = ?
            ORDER BY list_date DESC, property_id DESC
            "#
        ))
        .bind(seller_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// The listing only if `seller_id` owns it
    pub async fn find_owned(&self, property_id: &i64, seller_id: &i64) -> RepoResult<Option<Property>> {
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE property_id = ? AND seller_id = ?"
        ))
        .bind(property_id)
        .bind(seller_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    pub async fn find_images(&self, property_id: &i64) -> RepoResult<Vec<PropertyImage>> {
        sqlx::query_as::<_, PropertyImage>(
            "SELECT image_id, property_id, image FROM property_images WHERE property_id = ? ORDER BY image_id",
        )
        .bind(property_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Published listings with `min <= price <= max` (open bounds when None), minus `exclude`.
    /// Unordered: callers sample from the result.
    pub async fn find_published_in_price_range(
        &self,
        min_price: Option<i64>,
        max_price: Option<i64>,
        exclude: Option<i64>,
    ) -> RepoResult<Vec<Property>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE is_published = 1"
        ));
        if let Some(min) = min_price {
            query.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = max_price {
            query.push(" AND price <= ").push_bind(max);
        }
        if let Some(id) = exclude {
            query.push(" AND property_id <> ").push_bind(id);
        }

        query
            .build_query_as::<Property>()
            .fetch_all(&self.connection_pool)
            .await
    }

    async fn replace_images(
        conn: &mut SqliteConnection,
        property_id: i64,
        images: &[String],
    ) -> RepoResult<()> {
        sqlx::query("DELETE FROM property_images WHERE property_id = ?")
            .bind(property_id)
            .execute(&mut *conn)
            .await?;

        for image in images {
            sqlx::query("INSERT INTO property_images (property_id, image) VALUES (?, ?)")
                .bind(property_id)
                .bind(image)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }
}

impl Create<Property, CreatePropertyDTO> for PropertyRepository {
    async fn create(&self, data: &CreatePropertyDTO) -> RepoResult<Property> {
        let form = &data.form;
        // listing and gallery land together or not at all
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO properties (
                seller_id, title, description, price, property_type, status,
                bedrooms, bathrooms, area_sqft, location, facing, main_image,
                is_published, list_date
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(data.seller_id)
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.price)
        .bind(form.property_type)
        .bind(form.status)
        .bind(form.bedrooms)
        .bind(form.bathrooms)
        .bind(form.area_sqft)
        .bind(&form.location)
        .bind(&form.facing)
        .bind(&form.main_image)
        .bind(data.is_published)
        .bind(data.list_date)
        .execute(&mut *tx)
        .await?;

        let property_id = result.last_insert_rowid();
        Self::replace_images(&mut *tx, property_id, &form.images).await?;
        tx.commit().await?;

        Ok(Property {
            property_id,
            seller_id: data.seller_id,
            title: form.title.clone(),
            description: form.description.clone(),
            price: form.price,
            property_type: form.property_type,
            status: form.status,
            bedrooms: form.bedrooms,
            bathrooms: form.bathrooms,
            area_sqft: form.area_sqft,
            location: form.location.clone(),
            facing: form.facing.clone(),
            main_image: form.main_image.clone(),
            is_published: data.is_published,
            list_date: data.list_date,
        })
    }
}

impl Read<Property, i64> for PropertyRepository {
    async fn read(&self, id: &i64) -> RepoResult<Option<Property>> {
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE property_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<Property, PropertyFormDTO, i64> for PropertyRepository {
    async fn update(&self, id: &i64, form: &PropertyFormDTO) -> RepoResult<Property> {
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE properties
            SET title = ?, description = ?, price = ?, property_type = ?, status = ?,
                bedrooms = ?, bathrooms = ?, area_sqft = ?, location = ?, facing = ?,
                main_image = ?
            WHERE property_id = ?
            "#,
        )
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.price)
        .bind(form.property_type)
        .bind(form.status)
        .bind(form.bedrooms)
        .bind(form.bathrooms)
        .bind(form.area_sqft)
        .bind(&form.location)
        .bind(&form.facing)
        .bind(&form.main_image)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        if !form.images.is_empty() {
            Self::replace_images(&mut *tx, *id, &form.images).await?;
        }
        tx.commit().await?;

        self.read(id).await?.ok_or(sqlx::Error::RowNotFound)
    }
}

impl Delete<i64> for PropertyRepository {
    async fn delete(&self, id: &i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM properties WHERE property_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }
}
