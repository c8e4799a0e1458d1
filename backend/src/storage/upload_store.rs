use std::path::{Path, PathBuf};
use tokio::fs;

/// Flat directory of transient uploads: `blueprint_<timestamp>.<ext>` files that
/// live until cleanup, and `audio_<timestamp>.wav` files removed after use.
#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload directory error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Uploaded file is empty")]
    EmptyUpload,
}

/// A blueprint as stored on disk.
#[derive(Debug, Clone)]
pub struct StoredBlueprint {
    pub path: PathBuf,
    pub extension: String,
}

impl StoredBlueprint {
    fn from_path(path: PathBuf) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_string();
        Self { path, extension }
    }

    pub async fn read(&self) -> Result<Vec<u8>, StorageError> {
        Ok(fs::read(&self.path).await?)
    }
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Extension taken after the last `.` of the client's filename, as given.
    pub fn extension_of(file_name: &str) -> String {
        file_name.rsplit('.').next().unwrap_or_default().to_string()
    }

    pub async fn save_blueprint(
        &self,
        timestamp: &str,
        extension: &str,
        data: &[u8],
    ) -> Result<StoredBlueprint, StorageError> {
        if data.is_empty() {
            return Err(StorageError::EmptyUpload);
        }
        let path = self.dir.join(format!("blueprint_{}.{}", timestamp, extension));
        fs::write(&path, data).await?;
        log::info!("Stored blueprint upload at {}", path.display());
        Ok(StoredBlueprint {
            path,
            extension: extension.to_string(),
        })
    }

    pub async fn save_audio(&self, timestamp: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        if data.is_empty() {
            return Err(StorageError::EmptyUpload);
        }
        let path = self.dir.join(format!("audio_{}.wav", timestamp));
        fs::write(&path, data).await?;
        Ok(path)
    }

    pub async fn remove(&self, path: &Path) -> Result<(), StorageError> {
        fs::remove_file(path).await?;
        Ok(())
    }

    /// First stored blueprint (by name) whose filename starts with `blueprint_<id>`.
    pub async fn find_blueprint(
        &self,
        blueprint_id: &str,
    ) -> Result<Option<StoredBlueprint>, StorageError> {
        let prefix = format!("blueprint_{}", blueprint_id);
        let mut matches = Vec::new();

        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(&prefix) && entry.file_type().await?.is_file() {
                matches.push(entry.path());
            }
        }

        matches.sort();
        Ok(matches.into_iter().next().map(StoredBlueprint::from_path))
    }

    /// Deletes every file in the upload directory and returns how many went.
    pub async fn cleanup(&self) -> Result<usize, StorageError> {
        let mut deleted = 0;

        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                fs::remove_file(entry.path()).await?;
                deleted += 1;
            }
        }

        log::info!("Deleted {} files from {}", deleted, self.dir.display());
        Ok(deleted)
    }
}
