//! Core Module - infrastructure components of the application
//!
//! - Authentication, JWT and the seller guard
//! - Configuration
//! - Database bootstrap
//! - Error handling
//! - Request context and application state

pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod state;

// Re-exports
pub use auth::{
    Claims, authentication_middleware, decode_jwt, encode_jwt, identity_middleware,
    require_account_role, seller_guard_middleware,
};
pub use config::Config;
pub use context::{Flash, FlashLevel, Page, RequestContext};
pub use error::AppError;
pub use state::AppState;
