//! Repositories module - data access for every entity
//!
//! Each repository owns a handle to the SQLite pool and returns plain entities.
//! Queries are checked at run time (`query_as::<_, T>` + `FromRow`), so building the crate
//! never needs a live database.

pub mod message;
pub mod profile;
pub mod property;
pub mod traits;
pub mod user;

pub use traits::{Create, Delete, Read, ReadMany, RepoResult, Update};

pub use message::MessageRepository;
pub use profile::ProfileRepository;
pub use property::PropertyRepository;
pub use user::UserRepository;
