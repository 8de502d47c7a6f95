use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{MediaKind, ValidatedUpload};
use crate::error::{Error, Result};

/// Public URL prefix under which stored files are served.
pub const MEDIA_URL_PREFIX: &str = "/media";

/// Renders a stored relative path as the URL clients fetch it from.
#[must_use]
pub fn public_url(stored: &str) -> String {
    format!("{MEDIA_URL_PREFIX}/{stored}")
}

/// Stores uploaded files under `<data_dir>/media/<kind>/<uuid>.<ext>`.
///
/// Stored paths are relative to the media root (`<kind>/<file>`) so the data
/// directory can move without rewriting rows.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    base_path: PathBuf,
}

impl MediaStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_path: data_dir.join("media"),
        }
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path.join("tmp").join(Uuid::new_v4().to_string())
    }

    fn resolve(&self, stored: &str) -> Result<PathBuf> {
        let (kind, file_name) = stored.split_once('/').ok_or(Error::NotFound)?;
        MediaKind::from_dir_name(kind).ok_or(Error::NotFound)?;

        let valid_name = !file_name.is_empty()
            && !file_name.starts_with('.')
            && file_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
        if !valid_name {
            return Err(Error::NotFound);
        }

        Ok(self.base_path.join(kind).join(file_name))
    }

    /// Writes one validated upload and returns its stored relative path.
    pub async fn put(&self, kind: MediaKind, upload: &ValidatedUpload) -> Result<String> {
        let stored = format!(
            "{}/{}.{}",
            kind.dir_name(),
            Uuid::new_v4(),
            upload.extension
        );

        let temp_path = self.temp_path();
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut temp_file = File::create(&temp_path).await?;
        temp_file.write_all(&upload.data).await?;
        temp_file.sync_all().await?;

        let final_path = self.resolve(&stored)?;
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(stored)
    }

    /// Writes a batch of uploads. Either every file is written or none remain.
    pub async fn put_all(&self, kind: MediaKind, uploads: &[ValidatedUpload]) -> Result<Vec<String>> {
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.put(kind, upload).await {
                Ok(path) => stored.push(path),
                Err(e) => {
                    self.remove_all(&stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    pub async fn open(&self, stored: &str) -> Result<(File, u64)> {
        let path = self.resolve(stored)?;
        let file = File::open(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::NotFound
            } else {
                Error::Io(e)
            }
        })?;
        let size = file.metadata().await?.len();
        Ok((file, size))
    }

    pub async fn exists(&self, stored: &str) -> bool {
        match self.resolve(stored) {
            Ok(path) => fs::metadata(path).await.is_ok(),
            Err(_) => false,
        }
    }

    pub async fn remove(&self, stored: &str) -> Result<bool> {
        let path = self.resolve(stored)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Removes files whose rows are gone. Failures only leave stale files behind.
    pub async fn remove_all(&self, stored: &[String]) {
        for path in stored {
            if let Err(e) = self.remove(path).await {
                tracing::warn!("Failed to remove media file {path}: {e}");
            }
        }
    }
}
