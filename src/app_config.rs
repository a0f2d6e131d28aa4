//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with HOMESTEAD_)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! Secrets like database credentials and S3 keys should be kept in
//! environment variables, not in the config file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub description: String,
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Homestead".to_string(),
            description: "A real estate marketplace built in Rust".to_string(),
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Content limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Listings per page on browse and saved-listing views
    pub listings_per_page: u32,
    /// Inquiries per page on inbox/sent views
    pub inquiries_per_page: u32,
    /// Maximum upload size in MB
    pub max_upload_size_mb: u32,
    /// Maximum images per listing
    pub max_images_per_listing: u32,
    /// Maximum description length
    pub max_description_length: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            listings_per_page: 12,
            inquiries_per_page: 20,
            max_upload_size_mb: 10,
            max_images_per_listing: 20,
            max_description_length: 50000,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend: "local" or "s3"
    pub backend: String,
    /// Local storage path (used when backend = "local")
    pub local_path: String,
    /// S3 endpoint URL (used when backend = "s3")
    pub s3_endpoint: String,
    /// S3 region (used when backend = "s3")
    pub s3_region: String,
    /// S3 bucket name (used when backend = "s3")
    pub s3_bucket: String,
    /// S3 public URL for serving files (used when backend = "s3")
    pub s3_public_url: String,
    /// S3 access key (should be in env var HOMESTEAD_STORAGE_S3_ACCESS_KEY)
    #[serde(default)]
    pub s3_access_key: String,
    /// S3 secret key (should be in env var HOMESTEAD_STORAGE_S3_SECRET_KEY)
    #[serde(default)]
    pub s3_secret_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "local".to_string(),
            local_path: "./uploads".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_bucket: "homestead".to_string(),
            s3_public_url: "http://localhost:9000/homestead".to_string(),
            s3_access_key: String::new(),
            s3_secret_key: String::new(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub limits: LimitsConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file (optional)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // Override with environment variables (HOMESTEAD_ prefix)
            // e.g., HOMESTEAD_SITE_NAME, HOMESTEAD_STORAGE_BACKEND
            .add_source(
                Environment::with_prefix("HOMESTEAD")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Initialize application configuration
///
/// This triggers the lazy loading of the config file and logs the result.
/// Should be called early in application startup.
pub fn init() {
    let config = APP_CONFIG.read().unwrap();
    log::info!("Configuration loaded: site.name = {}", config.site.name);
}

// Convenience functions for accessing global config

/// Get the current application configuration
pub fn get_config() -> AppConfig {
    APP_CONFIG.read().map(|c| c.clone()).unwrap_or_default()
}

/// Get site configuration
pub fn site() -> SiteConfig {
    get_config().site
}

/// Get limits configuration
pub fn limits() -> LimitsConfig {
    get_config().limits
}

/// Get storage configuration
pub fn storage() -> StorageConfig {
    get_config().storage
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.site.name, "Homestead");
        assert_eq!(config.limits.listings_per_page, 12);
        assert_eq!(config.limits.inquiries_per_page, 20);
        assert_eq!(config.storage.backend, "local");
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[site]
name = "Test Estates"
base_url = "https://test.example.com"

[limits]
listings_per_page = 24
max_upload_size_mb = 5

[storage]
backend = "s3"
s3_bucket = "test-bucket"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(temp_file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.site.name, "Test Estates");
        assert_eq!(config.site.base_url, "https://test.example.com");
        assert_eq!(config.limits.listings_per_page, 24);
        assert_eq!(config.limits.max_upload_size_mb, 5);
        // Unspecified keys keep their defaults
        assert_eq!(config.limits.inquiries_per_page, 20);
        assert_eq!(config.storage.backend, "s3");
        assert_eq!(config.storage.s3_bucket, "test-bucket");
    }
}
