//! Configuration module
//!
//! Environment-driven configuration for the lesson media pipeline: asset host
//! selection, delivery and signing, upload limits and link verification.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DOCUMENT_FOLDER, DEFAULT_IMAGE_FOLDER, DEFAULT_OEMBED_ENDPOINT, DEFAULT_PDF_FOLDER,
    DEFAULT_VIDEO_FOLDER, LINK_VERIFY_TIMEOUT_SECS, MAX_DOCUMENT_SIZE_MB, MAX_IMAGE_SIZE_MB,
    MAX_VIDEO_SIZE_MB, MIB, SIGNED_URL_EXPIRY_SECS, VIDEO_UPLOAD_CHUNK_SIZE_MB,
    VIDEO_UPLOAD_TIMEOUT_SECS,
};
use crate::storage_types::HostBackend;

const MIN_SIGNING_SECRET_LEN: usize = 32;

/// Process-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub environment: String,
    /// `pretty` or `json`
    pub log_format: String,
}

/// Media pipeline configuration
#[derive(Clone, Debug)]
pub struct MediaPipelineConfig {
    pub base: BaseConfig,
    // Asset host configuration
    pub storage_backend: Option<HostBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    // Delivery and signing
    pub delivery_base_url: String,
    pub signing_secret: String,
    pub signed_url_expiry_secs: u64,
    // Upload limits
    pub max_video_size_bytes: usize,
    pub max_document_size_bytes: usize,
    pub max_image_size_bytes: usize,
    pub video_chunk_size_bytes: usize,
    pub video_upload_timeout_secs: u64,
    // Folders on the asset host
    pub video_folder: String,
    pub document_folder: String,
    pub pdf_folder: String,
    pub image_folder: String,
    // External links
    pub link_verify_timeout_secs: u64,
    pub oembed_endpoint: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<MediaPipelineConfig>);

impl Config {
    fn as_media(&self) -> &MediaPipelineConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = MediaPipelineConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_media().validate()
    }

    pub fn environment(&self) -> &str {
        &self.as_media().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.as_media().base.log_format
    }

    pub fn storage_backend(&self) -> Option<HostBackend> {
        self.as_media().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_media().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_media().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_media().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_media().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_media().local_storage_path.as_deref()
    }

    pub fn delivery_base_url(&self) -> &str {
        &self.as_media().delivery_base_url
    }

    pub fn signing_secret(&self) -> &str {
        &self.as_media().signing_secret
    }

    pub fn signed_url_expiry(&self) -> Duration {
        Duration::from_secs(self.as_media().signed_url_expiry_secs)
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.as_media().max_video_size_bytes
    }

    pub fn max_document_size_bytes(&self) -> usize {
        self.as_media().max_document_size_bytes
    }

    pub fn max_image_size_bytes(&self) -> usize {
        self.as_media().max_image_size_bytes
    }

    pub fn video_chunk_size_bytes(&self) -> usize {
        self.as_media().video_chunk_size_bytes
    }

    pub fn video_upload_timeout(&self) -> Duration {
        Duration::from_secs(self.as_media().video_upload_timeout_secs)
    }

    pub fn video_folder(&self) -> &str {
        &self.as_media().video_folder
    }

    pub fn document_folder(&self) -> &str {
        &self.as_media().document_folder
    }

    pub fn pdf_folder(&self) -> &str {
        &self.as_media().pdf_folder
    }

    pub fn image_folder(&self) -> &str {
        &self.as_media().image_folder
    }

    pub fn link_verify_timeout(&self) -> Duration {
        Duration::from_secs(self.as_media().link_verify_timeout_secs)
    }

    pub fn oembed_endpoint(&self) -> &str {
        &self.as_media().oembed_endpoint
    }
}

impl MediaPipelineConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let megabytes = |key: &str, default: usize| -> Result<usize, anyhow::Error> {
            var(key)
                .and_then(|s| s.trim().parse::<usize>().ok())
                .unwrap_or(default)
                .checked_mul(MIB)
                .ok_or_else(|| anyhow::anyhow!("{} is too large", key))
        };
        let seconds = |key: &str, default: u64| {
            var(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let base = BaseConfig {
            environment: var("ENVIRONMENT")
                .or_else(|| var("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            log_format: var("LOG_FORMAT")
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "pretty".to_string()),
        };

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(s) => Some(s.parse::<HostBackend>()?),
            None => None,
        };

        let config = MediaPipelineConfig {
            base,
            storage_backend,
            s3_bucket: var("S3_BUCKET"),
            s3_region: var("S3_REGION"),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_region: var("AWS_REGION"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            delivery_base_url: var("DELIVERY_BASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DELIVERY_BASE_URL must be set"))?,
            signing_secret: var("MEDIA_SIGNING_SECRET")
                .ok_or_else(|| anyhow::anyhow!("MEDIA_SIGNING_SECRET must be set"))?,
            signed_url_expiry_secs: seconds("SIGNED_URL_EXPIRY_SECONDS", SIGNED_URL_EXPIRY_SECS),
            max_video_size_bytes: megabytes("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB)?,
            max_document_size_bytes: megabytes("MAX_DOCUMENT_SIZE_MB", MAX_DOCUMENT_SIZE_MB)?,
            max_image_size_bytes: megabytes("MAX_IMAGE_SIZE_MB", MAX_IMAGE_SIZE_MB)?,
            video_chunk_size_bytes: megabytes(
                "VIDEO_UPLOAD_CHUNK_SIZE_MB",
                VIDEO_UPLOAD_CHUNK_SIZE_MB,
            )?,
            video_upload_timeout_secs: seconds(
                "VIDEO_UPLOAD_TIMEOUT_SECONDS",
                VIDEO_UPLOAD_TIMEOUT_SECS,
            ),
            video_folder: var("VIDEO_FOLDER").unwrap_or_else(|| DEFAULT_VIDEO_FOLDER.to_string()),
            document_folder: var("DOCUMENT_FOLDER")
                .unwrap_or_else(|| DEFAULT_DOCUMENT_FOLDER.to_string()),
            pdf_folder: var("PDF_FOLDER").unwrap_or_else(|| DEFAULT_PDF_FOLDER.to_string()),
            image_folder: var("IMAGE_FOLDER").unwrap_or_else(|| DEFAULT_IMAGE_FOLDER.to_string()),
            link_verify_timeout_secs: seconds(
                "LINK_VERIFY_TIMEOUT_SECONDS",
                LINK_VERIFY_TIMEOUT_SECS,
            ),
            oembed_endpoint: var("OEMBED_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_OEMBED_ENDPOINT.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.signing_secret.len() < MIN_SIGNING_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "MEDIA_SIGNING_SECRET must be at least {} characters long",
                MIN_SIGNING_SECRET_LEN
            ));
        }

        if !self.delivery_base_url.starts_with("http://")
            && !self.delivery_base_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "DELIVERY_BASE_URL must start with http:// or https://"
            ));
        }

        if self.signed_url_expiry_secs == 0 {
            return Err(anyhow::anyhow!(
                "SIGNED_URL_EXPIRY_SECONDS must be greater than zero"
            ));
        }

        if self.video_chunk_size_bytes == 0 || self.video_upload_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "VIDEO_UPLOAD_CHUNK_SIZE_MB and VIDEO_UPLOAD_TIMEOUT_SECONDS must be greater than zero"
            ));
        }

        if self.link_verify_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "LINK_VERIFY_TIMEOUT_SECONDS must be greater than zero"
            ));
        }

        if self.base.log_format != "pretty" && self.base.log_format != "json" {
            return Err(anyhow::anyhow!("LOG_FORMAT must be either pretty or json"));
        }

        // Validate asset host configuration
        let backend = self.storage_backend.unwrap_or(HostBackend::S3);
        match backend {
            HostBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            HostBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
