//! Repository traits
//!
//! Generic CRUD seams implemented by the SQLite repositories. Entity-specific finders live
//! as inherent methods on each repository.

/// Result of every repository call
pub type RepoResult<T> = Result<T, sqlx::Error>;

/// Inserts a new row
///
/// * `Entity` - what comes back, with the id assigned by the database
/// * `CreateDTO` - insert payload, without id
pub trait Create<Entity, CreateDTO> {
    async fn create(&self, data: &CreateDTO) -> RepoResult<Entity>;
}

/// Reads one row by primary key
///
/// # Returns
/// * `Ok(Some(Entity))` - found
/// * `Ok(None)` - no row with that key
pub trait Read<Entity, Id> {
    async fn read(&self, id: &Id) -> RepoResult<Option<Entity>>;
}

/// Reads several rows by primary key in a single query
pub trait ReadMany<Entity, Id> {
    /// # Note
    /// Entities come back in database order, not in the order of `ids`.
    /// Missing ids are silently skipped.
    async fn read_many(&self, ids: &[Id]) -> RepoResult<Vec<Entity>>;
}

/// Updates an existing row and returns it as stored
///
/// # Returns
/// * `Err(sqlx::Error::RowNotFound)` - no row with that key
pub trait Update<Entity, UpdateDTO, Id> {
    async fn update(&self, id: &Id, data: &UpdateDTO) -> RepoResult<Entity>;
}

/// Deletes a row; dependent rows go through `ON DELETE CASCADE`
pub trait Delete<Id> {
    async fn delete(&self, id: &Id) -> RepoResult<()>;
}
