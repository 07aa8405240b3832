use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Bucketed object storage on the local filesystem. Objects are served back
/// under `<public_base_url>/storage/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl ObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        let mut path = self.root.join(checked_segment(bucket)?);
        for segment in key.split('/').filter(|s| !s.is_empty()) {
            path.push(checked_segment(segment)?);
        }
        Ok(path)
    }

    /// File names directly under `bucket/prefix`, sorted, at most `limit`.
    /// A prefix that does not exist yet lists as empty.
    pub async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<String>, StorageError> {
        let dir = self.object_path(bucket, prefix)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        names.truncate(limit);
        Ok(names)
    }

    pub async fn upload(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        info!("Stored {} bytes at {}/{}", bytes.len(), bucket, key);
        Ok(())
    }

    /// Returns false when there was nothing to remove.
    pub async fn remove(&self, bucket: &str, key: &str) -> Result<bool, StorageError> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/{}/{}",
            self.public_base_url,
            bucket,
            key.trim_start_matches('/')
        )
    }

    /// Inverse of [`ObjectStorage::public_url`]; `None` for foreign URLs.
    pub fn key_from_public_url(&self, bucket: &str, url: &str) -> Option<String> {
        let prefix = format!("{}/storage/{}/", self.public_base_url, bucket);
        url.strip_prefix(&prefix)
            .filter(|key| !key.is_empty())
            .map(|key| key.to_string())
    }
}

fn checked_segment(segment: &str) -> Result<&str, StorageError> {
    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !segment.contains('\\') => Ok(segment),
        _ => Err(StorageError::InvalidPath(segment.to_string())),
    }
}
