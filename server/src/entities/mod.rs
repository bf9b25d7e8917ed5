//! Entities module - domain entities
//!
//! Every entity maps to one table of the database.

pub mod enums;
pub mod message;
pub mod profile;
pub mod property;
pub mod user;

// Re-exports
pub use enums::{AccountRole, ListingStatus, PropertyType};
pub use message::Message;
pub use profile::Profile;
pub use property::{Property, PropertyImage};
pub use user::User;
