//! Property DTOs - listings, home page and seller forms

use crate::entities::{ListingStatus, Property, PropertyImage, PropertyType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Listing as shown to the client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PropertyDTO {
    pub id: i64,
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    /// Integer minor currency units (paise for INR)
    pub price: i64,
    pub property_type: PropertyType,
    pub status: ListingStatus,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqft: i32,
    pub location: String,
    pub facing: Option<String>,
    pub main_image: String,
    pub is_published: bool,
    pub list_date: DateTime<Utc>,
}

impl From<Property> for PropertyDTO {
    fn from(value: Property) -> Self {
        Self {
            id: value.property_id,
            seller_id: value.seller_id,
            title: value.title,
            description: value.description,
            price: value.price,
            property_type: value.property_type,
            status: value.status,
            bedrooms: value.bedrooms,
            bathrooms: value.bathrooms,
            area_sqft: value.area_sqft,
            location: value.location,
            facing: value.facing,
            main_image: value.main_image,
            is_published: value.is_published,
            list_date: value.list_date,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Seller form, used both to add and to edit a listing.
/// `seller` and `is_published` are never taken from the client.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct PropertyFormDTO {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    /// Integer minor currency units, as stored and compared against buyer budgets
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i64,
    pub property_type: PropertyType,
    pub status: ListingStatus,
    #[validate(range(min = 0))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0))]
    pub bathrooms: Option<i32>,
    #[validate(range(min = 1))]
    pub area_sqft: i32,
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub location: String,
    #[validate(length(max = 50))]
    pub facing: Option<String>,
    /// Reference returned by the image upload endpoint
    #[validate(length(min = 1, max = 255))]
    pub main_image: String,
    /// Extra gallery images; on edit a non-empty list replaces the gallery
    #[serde(default)]
    pub images: Vec<String>,
}

/// DTO used by the repository to insert a listing
#[derive(Debug, Clone)]
pub struct CreatePropertyDTO {
    pub seller_id: i64,
    pub form: PropertyFormDTO,
    pub is_published: bool,
    pub list_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PropertyDetailDTO {
    pub property: PropertyDTO,
    pub additional_images: Vec<String>,
}

impl PropertyDetailDTO {
    pub fn new(property: Property, images: Vec<PropertyImage>) -> Self {
        Self {
            property: property.into(),
            additional_images: images.into_iter().map(|i| i.image).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HomeDTO {
    pub showcase_property: Option<PropertyDTO>,
    pub featured_houses: Vec<PropertyDTO>,
    pub featured_land: Vec<PropertyDTO>,
    pub recommended_properties: Vec<PropertyDTO>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PropertyListDTO {
    pub properties: Vec<PropertyDTO>,
    pub featured_properties: Vec<PropertyDTO>,
    pub active_filter: Option<PropertyType>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FavoriteDTO {
    pub property_id: i64,
    pub favorited: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DeletePropertyDTO {
    pub property_id: i64,
    pub deleted: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ImageUploadDTO {
    pub image_ref: String,
}
