//! Services module - HTTP handlers grouped by feature
//!
//! Each sub-module owns the endpoints of one area of the application.

pub mod auth;
pub mod inbox;
pub mod listings;
pub mod recommendation;
pub mod user;

// Re-exports
pub use auth::{login_user, logout_user, password_reset_confirm, password_reset_verify, register_user};
pub use inbox::{aggregate_conversations, get_conversation, list_conversations, reply_in_conversation};
pub use listings::{
    add_property, delete_property, edit_property, home, property_detail, property_list,
    seller_dashboard, send_inquiry, toggle_favorite, upload_image,
};
pub use recommendation::{Recommendation, RecommendationCriteria, recommend_for};
pub use user::{change_password, get_settings, update_settings};

use axum::{http::StatusCode, response::IntoResponse};

/// Health check
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
