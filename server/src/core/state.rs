//! Application State - shared application state
//!
//! Holds every repository, the image store and the secrets needed to serve a request.

use crate::repositories::{MessageRepository, ProfileRepository, PropertyRepository, UserRepository};
use crate::storage::LocalImageStore;
use sqlx::SqlitePool;

/// Global state shared by every route and middleware
pub struct AppState {
    /// Accounts
    pub user: UserRepository,

    /// Buyer preferences and wishlists
    pub profile: ProfileRepository,

    /// Listings and their images
    pub property: PropertyRepository,

    /// Message store
    pub msg: MessageRepository,

    /// Where uploaded property images are written
    pub images: LocalImageStore,

    /// Secret key for JWT tokens
    pub jwt_secret: String,
}

impl AppState {
    /// Creates a new AppState wiring every repository to the given pool.
    ///
    /// # Arguments
    /// * `pool` - Shared SQLite connection pool
    /// * `jwt_secret` - Secret used to sign JWT tokens
    /// * `media_root` - Root directory of the image store
    pub fn new(pool: SqlitePool, jwt_secret: String, media_root: impl Into<String>) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            profile: ProfileRepository::new(pool.clone()),
            property: PropertyRepository::new(pool.clone()),
            msg: MessageRepository::new(pool),
            images: LocalImageStore::new(media_root.into()),
            jwt_secret,
        }
    }
}
