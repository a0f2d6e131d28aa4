//! Storage backend abstraction for image uploads.
//!
//! Supports multiple backends:
//! - `local`: Local filesystem storage
//! - `s3`: S3-compatible object storage (MinIO, AWS S3, etc.)
//!
//! The application stores only the object key (content hash + extension)
//! and the public reference URL; serving the bytes is the static layer's
//! job.

pub mod local;
pub mod s3;

use async_trait::async_trait;
use once_cell::sync::OnceCell;

/// Storage operation errors.
#[derive(Debug)]
pub enum StorageError {
    /// File not found
    NotFound(String),
    /// I/O error
    Io(std::io::Error),
    /// S3 error
    S3(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
            StorageError::S3(msg) => write!(f, "S3 error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

/// Trait for storage backends.
///
/// All storage backends must implement this trait to provide a unified
/// interface for image payloads.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a payload under its key.
    ///
    /// Files are stored with a prefix structure based on the key:
    /// `{key[0:2]}/{key[2:4]}/{key}`
    async fn put_object(&self, data: Vec<u8>, key: &str) -> Result<(), StorageError>;

    /// Remove a stored payload. Missing objects are not an error.
    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;

    /// Check if a payload exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Durable public URL for a stored payload.
    fn public_url(&self, key: &str) -> String;
}

static STORAGE: OnceCell<Box<dyn StorageBackend>> = OnceCell::new();

/// Initialize the storage backend selected by configuration.
/// Panics on misconfiguration; called once at startup.
pub fn init() {
    let config = crate::app_config::storage();

    let backend: Box<dyn StorageBackend> = match config.backend.as_str() {
        "s3" => Box::new(s3::S3Storage::from_config(&config)),
        "local" => Box::new(
            local::LocalStorage::new(config.local_path.clone().into())
                .expect("Failed to initialize local storage."),
        ),
        other => panic!("Unknown storage backend {:?}", other),
    };

    STORAGE
        .set(backend)
        .unwrap_or_else(|_| panic!("storage::init() called more than once."));
}

/// Returns the configured storage backend.
/// Panics if `init()` has not run.
pub fn get_storage() -> &'static dyn StorageBackend {
    STORAGE
        .get()
        .expect("Storage backend is not initialized.")
        .as_ref()
}

/// Prefix path for a key: `ab/cd/abcd...`.
/// Spreads objects across directories so no single directory grows huge.
pub(crate) fn key_path(key: &str) -> String {
    if key.len() < 4 {
        key.to_string()
    } else {
        format!("{}/{}/{}", &key[0..2], &key[2..4], key)
    }
}

/// Content-addressed object key for an image payload: blake3 hash plus the
/// canonical extension for its content type. Identical uploads share a key,
/// which makes re-uploads idempotent at the storage layer.
pub fn object_key(data: &[u8], content_type: &str) -> String {
    let hash = blake3::hash(data);
    format!("{}.{}", hash, extension_for(content_type))
}

/// Canonical file extension for the image content types uploads may carry.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/avif" => "avif",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_path_prefixes() {
        assert_eq!(key_path("abcdef.jpg"), "ab/cd/abcdef.jpg");
        assert_eq!(key_path("ab"), "ab");
    }

    #[test]
    fn test_object_key_is_content_addressed() {
        let a = object_key(b"pixels", "image/png");
        let b = object_key(b"pixels", "image/png");
        let c = object_key(b"other pixels", "image/png");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.ends_with(".png"));
    }

    #[test]
    fn test_extension_for_unknown_type() {
        assert_eq!(extension_for("application/octet-stream"), "bin");
        assert_eq!(extension_for("image/jpeg"), "jpg");
    }
}
