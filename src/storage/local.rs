//! Local filesystem storage backend.

use super::{key_path, StorageBackend, StorageError};
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

/// Local filesystem storage backend.
pub struct LocalStorage {
    /// Base path for file storage
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend.
    ///
    /// The `base_path` directory will be created if it doesn't exist.
    pub fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path)?;
        log::info!("LocalStorage initialized at {:?}", base_path);
        Ok(Self { base_path })
    }

    /// Get the full path for a key, including prefix directories.
    fn get_file_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key_path(key))
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn put_object(&self, data: Vec<u8>, key: &str) -> Result<(), StorageError> {
        log::debug!("LocalStorage: put_object: {}", key);

        let path = self.get_file_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        log::debug!("LocalStorage: delete_object: {}", key);

        match fs::remove_file(self.get_file_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get_file_path(key).exists())
    }

    /// Local objects are served by the front web server mounted on
    /// `/media/`; the path mirrors the on-disk prefix layout.
    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/media/{}",
            crate::app_config::site().base_url.trim_end_matches('/'),
            key_path(key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_put_exists_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_path_buf()).unwrap();

        let key = "aabbccdd.png";
        assert!(!storage.exists(key).await.unwrap());

        storage.put_object(b"pixels".to_vec(), key).await.unwrap();
        assert!(storage.exists(key).await.unwrap());

        // Prefix directories come from the key.
        assert!(dir.path().join("aa/bb/aabbccdd.png").is_file());

        storage.delete_object(key).await.unwrap();
        assert!(!storage.exists(key).await.unwrap());

        // Deleting again is not an error.
        storage.delete_object(key).await.unwrap();
    }
}
