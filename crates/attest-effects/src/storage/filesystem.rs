//! Filesystem storage handler
//!
//! Stores each key as a `.dat` file under a base directory. Keys may contain
//! `/` separators, which become subdirectories. Every value is written to a
//! temporary sibling file and renamed into place, so a crash never leaves a
//! torn value behind.
//!
//! `store_batch` stages every file before renaming any, and removes all staged
//! files if staging or a rename fails. Renames are not transactional across
//! files: when a rename fails partway, keys renamed before the failure keep
//! their new values and the call still returns an error.

use async_trait::async_trait;
use attest_core::effects::{StorageEffects, StorageError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::fs::DirEntry;

/// Filesystem-based storage handler
#[derive(Debug, Clone)]
pub struct FilesystemStorageHandler {
    /// Base directory for storage files
    base_path: PathBuf,
}

impl FilesystemStorageHandler {
    /// Create a new filesystem storage handler
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Base directory of this handler
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey {
                reason: "Key cannot be empty".to_string(),
            });
        }
        if key.starts_with('/')
            || key
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(StorageError::InvalidKey {
                reason: format!("Key {key:?} must be a relative path without empty or dot segments"),
            });
        }
        Ok(self.base_path.join(format!("{key}.dat")))
    }

    async fn write_staged(&self, key: &str, value: &[u8]) -> Result<(PathBuf, PathBuf), StorageError> {
        let file_path = self.path_for(key)?;
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::WriteFailed(format!("Failed to create directory: {e}"))
            })?;
        }

        let staged = file_path.with_extension("dat.tmp");
        fs::write(&staged, value)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("Failed to write file: {e}")))?;
        Ok((staged, file_path))
    }

    async fn visit_entry_for_keys(
        base: &Path,
        entry: DirEntry,
        prefix: Option<&str>,
        stack: &mut Vec<PathBuf>,
        keys: &mut Vec<String>,
    ) -> Result<(), StorageError> {
        let file_type = entry.file_type().await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to stat directory entry: {e}"))
        })?;
        let path = entry.path();

        if file_type.is_dir() {
            stack.push(path);
            return Ok(());
        }
        if !file_type.is_file() || path.extension().and_then(|e| e.to_str()) != Some("dat") {
            return Ok(());
        }

        let rel = path.strip_prefix(base).map_err(|e| {
            StorageError::ReadFailed(format!("Failed to compute relative key path: {e}"))
        })?;
        let mut key = rel.with_extension("").to_string_lossy().to_string();
        if std::path::MAIN_SEPARATOR != '/' {
            key = key.replace(std::path::MAIN_SEPARATOR, "/");
        }

        if prefix.map_or(true, |p| key.starts_with(p)) {
            keys.push(key);
        }
        Ok(())
    }
}

#[async_trait]
impl StorageEffects for FilesystemStorageHandler {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let (staged, file_path) = self.write_staged(key, &value).await?;
        fs::rename(&staged, &file_path)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("Failed to commit file: {e}")))?;

        tracing::debug!(key, bytes = value.len(), "Stored value on filesystem");
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let file_path = self.path_for(key)?;
        if !file_path.exists() {
            return Ok(None);
        }

        let data = fs::read(&file_path)
            .await
            .map_err(|e| StorageError::ReadFailed(format!("Failed to read file: {e}")))?;
        Ok(Some(data))
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut stack: Vec<PathBuf> = vec![self.base_path.clone()];

        while let Some(dir) = stack.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(e) => e,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StorageError::ReadFailed(format!(
                        "Failed to read directory: {e}"
                    )))
                }
            };

            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                StorageError::ReadFailed(format!("Failed to read directory entry: {e}"))
            })? {
                Self::visit_entry_for_keys(&self.base_path, entry, prefix, &mut stack, &mut keys)
                    .await?;
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn store_batch(&self, pairs: HashMap<String, Vec<u8>>) -> Result<(), StorageError> {
        // Stage everything first so a write failure leaves no key committed.
        let mut staged = Vec::with_capacity(pairs.len());
        for (key, value) in &pairs {
            match self.write_staged(key, value).await {
                Ok(paths) => staged.push(paths),
                Err(e) => {
                    for (tmp, _) in staged {
                        let _ = fs::remove_file(tmp).await;
                    }
                    return Err(e);
                }
            }
        }

        let mut pending = staged.into_iter();
        while let Some((tmp, file_path)) = pending.next() {
            if let Err(e) = fs::rename(&tmp, &file_path).await {
                tracing::warn!(
                    path = %file_path.display(),
                    error = %e,
                    "Batch rename failed, discarding staged files"
                );
                let _ = fs::remove_file(&tmp).await;
                for (rest, _) in pending {
                    let _ = fs::remove_file(rest).await;
                }
                return Err(StorageError::WriteFailed(format!("Failed to commit file: {e}")));
            }
        }

        tracing::debug!(keys = pairs.len(), "Committed storage batch on filesystem");
        Ok(())
    }
}
