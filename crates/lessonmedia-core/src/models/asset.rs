use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

/// Kind of media a lesson can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Document,
    Image,
}

impl MediaKind {
    /// Resource segment used in delivery URLs.
    pub fn resource_type(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Document => "raw",
            MediaKind::Image => "image",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Document => write!(f, "document"),
            MediaKind::Image => write!(f, "image"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "video" => Ok(MediaKind::Video),
            "document" => Ok(MediaKind::Document),
            "image" => Ok(MediaKind::Image),
            _ => Err(anyhow::anyhow!("Invalid media kind: {}", s)),
        }
    }
}

/// Whether an asset is served directly or only through a signed URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessPolicy {
    Private,
    Public,
}

impl AccessPolicy {
    /// Videos are private; documents and images are always public.
    pub fn for_kind(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Video => AccessPolicy::Private,
            MediaKind::Document | MediaKind::Image => AccessPolicy::Public,
        }
    }

    /// Delivery type segment used in URLs.
    pub fn delivery_type(&self) -> &'static str {
        match self {
            AccessPolicy::Private => "authenticated",
            AccessPolicy::Public => "upload",
        }
    }
}

impl Display for AccessPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AccessPolicy::Private => write!(f, "private"),
            AccessPolicy::Public => write!(f, "public"),
        }
    }
}

/// An uploaded lesson file as stored by the asset host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    /// Opaque handle issued by the asset host.
    pub external_id: String,
    pub kind: MediaKind,
    pub access_policy: AccessPolicy,
    pub format: String,
    pub byte_size: u64,
    pub duration_seconds: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl MediaAsset {
    pub fn is_private(&self) -> bool {
        self.access_policy == AccessPolicy::Private
    }
}

/// Caller-declared description of an upload buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub filename: String,
    pub content_type: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl UploadMetadata {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            ..Default::default()
        }
    }

    /// Lowercased file extension, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }

    /// Filename without its extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type.eq_ignore_ascii_case("application/pdf")
            || self.extension().as_deref() == Some("pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_follows_kind() {
        assert_eq!(AccessPolicy::for_kind(MediaKind::Video), AccessPolicy::Private);
        assert_eq!(AccessPolicy::for_kind(MediaKind::Document), AccessPolicy::Public);
        assert_eq!(AccessPolicy::for_kind(MediaKind::Image), AccessPolicy::Public);
    }

    #[test]
    fn detects_pdf_by_type_or_extension() {
        assert!(UploadMetadata::new("syllabus.PDF", "application/octet-stream").is_pdf());
        assert!(UploadMetadata::new("syllabus", "application/pdf").is_pdf());
        assert!(!UploadMetadata::new("notes.zip", "application/zip").is_pdf());
    }

    #[test]
    fn stem_strips_extension() {
        let meta = UploadMetadata::new("week-1 intro.pdf", "application/pdf");
        assert_eq!(meta.stem(), "week-1 intro");
        assert_eq!(meta.extension().as_deref(), Some("pdf"));
    }

    #[test]
    fn kind_round_trips_through_display() {
        for kind in [MediaKind::Video, MediaKind::Document, MediaKind::Image] {
            assert_eq!(kind.to_string().parse::<MediaKind>().unwrap(), kind);
        }
    }
}
