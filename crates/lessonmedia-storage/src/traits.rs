//! Asset host abstraction trait
//!
//! This module defines the `AssetHost` trait that every asset hosting backend
//! implements, together with the options a caller passes per upload and the
//! metadata the host returns.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use lessonmedia_core::{AccessPolicy, HostBackend, MediaAsset, MediaKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Asset host operation errors
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Asset already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid asset id: {0}")]
    InvalidKey(String),

    #[error("Asset host backend error: {0}")]
    BackendError(String),

    #[error("Invalid asset metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for asset host operations
pub type HostResult<T> = Result<T, HostError>;

/// Structured options for one upload.
#[derive(Debug, Clone)]
pub struct HostUploadOptions {
    pub kind: MediaKind,
    pub access: AccessPolicy,
    /// Logical folder the asset lives under.
    pub folder: String,
    /// Name within the folder.
    pub public_id: String,
    pub content_type: String,
    /// Original filename, used to derive the stored format.
    pub filename: String,
    /// Replace an existing asset with the same id instead of failing.
    pub overwrite: bool,
    /// Push the payload in parts of this size when it is larger.
    pub chunk_size: Option<usize>,
    /// Descriptive metadata (alt text, caption).
    pub context: BTreeMap<String, String>,
    pub duration_seconds: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl HostUploadOptions {
    pub fn new(
        kind: MediaKind,
        folder: impl Into<String>,
        public_id: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        let public_id = public_id.into();
        Self {
            kind,
            access: AccessPolicy::for_kind(kind),
            folder: folder.into(),
            filename: public_id.clone(),
            public_id,
            content_type: content_type.into(),
            overwrite: false,
            chunk_size: None,
            context: BTreeMap::new(),
            duration_seconds: None,
            width: None,
            height: None,
        }
    }

    /// The id the host will assign: `{folder}/{public_id}`.
    pub fn external_id(&self) -> String {
        crate::keys::external_id(&self.folder, &self.public_id)
    }
}

/// What the host knows about a stored asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedAsset {
    pub external_id: String,
    pub kind: MediaKind,
    pub access: AccessPolicy,
    pub format: String,
    pub content_type: String,
    pub byte_size: u64,
    pub duration_seconds: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl HostedAsset {
    /// Describe an asset just written with `options`.
    pub fn from_upload(options: &HostUploadOptions, byte_size: u64) -> Self {
        Self {
            external_id: options.external_id(),
            kind: options.kind,
            access: options.access,
            format: crate::keys::format_for(&options.content_type, &options.filename),
            content_type: options.content_type.clone(),
            byte_size,
            duration_seconds: options.duration_seconds,
            width: options.width,
            height: options.height,
            context: options.context.clone(),
            created_at: Utc::now(),
        }
    }

    pub fn into_media_asset(self) -> MediaAsset {
        MediaAsset {
            external_id: self.external_id,
            kind: self.kind,
            access_policy: self.access,
            format: self.format,
            byte_size: self.byte_size,
            duration_seconds: self.duration_seconds,
            width: self.width,
            height: self.height,
            created_at: self.created_at,
        }
    }
}

/// Asset hosting service abstraction
///
/// Every call is one round trip to the host. Implementations never retry;
/// the caller decides whether a failed call is worth repeating.
#[async_trait]
pub trait AssetHost: Send + Sync {
    /// Store `data` and return what the host recorded about it.
    async fn upload(&self, data: Bytes, options: &HostUploadOptions) -> HostResult<HostedAsset>;

    /// Delete an asset and its metadata.
    async fn delete(&self, external_id: &str) -> HostResult<()>;

    /// Fetch stored metadata by id.
    async fn metadata(&self, external_id: &str) -> HostResult<HostedAsset>;

    /// Get the backend type
    fn backend_type(&self) -> HostBackend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_policy_follows_kind() {
        let video = HostUploadOptions::new(MediaKind::Video, "lessons/videos", "abc", "video/mp4");
        assert_eq!(video.access, AccessPolicy::Private);
        assert_eq!(video.external_id(), "lessons/videos/abc");

        let doc = HostUploadOptions::new(
            MediaKind::Document,
            "lessons/documents/",
            "notes.zip",
            "application/zip",
        );
        assert_eq!(doc.access, AccessPolicy::Public);
        assert_eq!(doc.external_id(), "lessons/documents/notes.zip");
    }

    #[test]
    fn hosted_asset_converts_to_media_asset() {
        let mut options =
            HostUploadOptions::new(MediaKind::Video, "lessons/videos", "abc", "video/webm");
        options.duration_seconds = Some(12.5);
        let hosted = HostedAsset::from_upload(&options, 2048);
        let asset = hosted.into_media_asset();
        assert_eq!(asset.external_id, "lessons/videos/abc");
        assert_eq!(asset.format, "webm");
        assert_eq!(asset.byte_size, 2048);
        assert_eq!(asset.duration_seconds, Some(12.5));
        assert!(asset.is_private());
    }
}
