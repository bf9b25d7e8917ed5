#![allow(dead_code)]

use axum_test::TestServer;
use axum_test::http::HeaderName;
use chrono::Utc;
use estate_server::core::db::connect_in_memory;
use estate_server::core::{AppState, encode_jwt};
use estate_server::dtos::{CreatePropertyDTO, CreateUserDTO, PropertyFormDTO};
use estate_server::entities::{AccountRole, ListingStatus, Property, PropertyType, User};
use estate_server::repositories::Create;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;

pub const JWT_SECRET: &str = "integration-tests-secret";
pub const PASSWORD: &str = "Password123";

/// Creates an AppState on a fresh, migrated in-memory database
///
/// # Arguments
/// * `media_root` - Root directory of the image store
pub async fn create_test_state(media_root: &Path) -> Arc<AppState> {
    create_test_state_with_pool(media_root).await.0
}

/// Same as [`create_test_state`], also handing back the pool for direct SQL setup
pub async fn create_test_state_with_pool(media_root: &Path) -> (Arc<AppState>, SqlitePool) {
    let pool = connect_in_memory()
        .await
        .expect("Failed to open in-memory database");
    let state = Arc::new(AppState::new(
        pool.clone(),
        JWT_SECRET.to_string(),
        media_root.to_string_lossy().to_string(),
    ));
    (state, pool)
}

/// Creates a TestServer on top of the application router
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = estate_server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Session token for the given user, valid for 24 hours
pub fn create_test_jwt(user: &User) -> String {
    encode_jwt(user, JWT_SECRET).expect("Failed to create JWT token")
}

pub fn auth_header() -> HeaderName {
    HeaderName::from_static("authorization")
}

pub fn bearer(user: &User) -> String {
    format!("Bearer {}", create_test_jwt(user))
}

/// Inserts an account (and its empty profile) with password [`PASSWORD`]
pub async fn seed_user(state: &AppState, email: &str, role: AccountRole) -> User {
    let new_user = CreateUserDTO {
        email: email.to_string(),
        password: User::hash_password(PASSWORD).expect("hash"),
        first_name: email.split('@').next().unwrap_or("user").to_string(),
        last_name: "Tester".to_string(),
        role,
    };
    state
        .user
        .create_with_profile(&new_user, None, None)
        .await
        .expect("Failed to seed user")
}

pub fn property_form(property_type: PropertyType, price: i64, location: &str) -> PropertyFormDTO {
    let (bedrooms, bathrooms, facing) = match property_type {
        PropertyType::House => (Some(3), Some(2), None),
        PropertyType::Land => (None, None, Some("East".to_string())),
    };
    PropertyFormDTO {
        title: format!("{:?} in {}", property_type, location),
        description: "Well kept and close to the market".to_string(),
        price,
        property_type,
        status: ListingStatus::ForSale,
        bedrooms,
        bathrooms,
        area_sqft: 1500,
        location: location.to_string(),
        facing,
        main_image: "properties/2025/01/01/main.jpg".to_string(),
        images: Vec::new(),
    }
}

/// Inserts a published listing owned by `seller_id`
pub async fn seed_property(
    state: &AppState,
    seller_id: i64,
    property_type: PropertyType,
    price: i64,
    location: &str,
) -> Property {
    state
        .property
        .create(&CreatePropertyDTO {
            seller_id,
            form: property_form(property_type, price, location),
            is_published: true,
            list_date: Utc::now(),
        })
        .await
        .expect("Failed to seed property")
}
