//! Property entity - a listing owned by a seller

use super::enums::{ListingStatus, PropertyType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Property {
    pub property_id: i64,
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    // minor currency units, never floats
    pub price: i64,
    pub property_type: PropertyType,
    pub status: ListingStatus,
    // house-only, NULL for land
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqft: i32,
    pub location: String,
    // land-only, e.g. "South"
    pub facing: Option<String>,
    /// Opaque reference into the image store
    pub main_image: String,
    pub is_published: bool,
    pub list_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct PropertyImage {
    pub image_id: i64,
    pub property_id: i64,
    pub image: String,
}
