use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use crate::errors::XaiError;
use crate::utils::filename::secure_filename;

#[derive(Debug, Clone, PartialEq)]
pub struct SavedUpload {
    /// Unique on-disk name, `<uuid>_<sanitized original>`.
    pub filename: String,
    pub path: PathBuf,
}

/// Flat directory of uploaded images with collision-free names.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, XaiError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<SavedUpload, XaiError> {
        let filename = format!(
            "{}_{}",
            uuid::Uuid::new_v4().simple(),
            secure_filename(original_name)
        );
        let path = self.dir.join(&filename);

        // create_new: a name clash is an error, never a silent overwrite.
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        debug!(filename = %filename, size = bytes.len(), "Upload saved");
        Ok(SavedUpload { filename, path })
    }
}
