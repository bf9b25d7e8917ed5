//! Image store - uploaded property pictures on the local filesystem
//!
//! Listings only keep the returned reference (a path relative to the store root).

use chrono::{Datelike, Utc};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Lower-cased extension of `file_name` if it is an accepted image type
    pub fn image_extension(file_name: &str) -> Option<String> {
        let (_, ext) = file_name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
    }

    /// Writes the image under `properties/YYYY/MM/DD/` and returns its reference.
    pub async fn save(&self, extension: &str, bytes: &[u8]) -> std::io::Result<String> {
        let today = Utc::now().date_naive();
        let relative = format!(
            "properties/{:04}/{:02}/{:02}/{}.{}",
            today.year(),
            today.month(),
            today.day(),
            Uuid::new_v4(),
            extension
        );
        let path = self.root.join(&relative);

        if let Some(parent) = path.parent() {
            debug!("Ensuring directory {:?}", parent);
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;

        info!("Stored image {} ({} bytes)", relative, bytes.len());
        Ok(relative)
    }
}
