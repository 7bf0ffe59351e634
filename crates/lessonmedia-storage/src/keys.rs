//! Shared id and format rules for asset host backends.
//!
//! Id format: `{folder}/{name}`. Metadata lives next to the asset at `{id}.meta.json`.

use std::path::Path;

use crate::traits::{HostError, HostResult};

const SIDECAR_SUFFIX: &str = ".meta.json";

/// Join a folder and a name into an external id.
pub fn external_id(folder: &str, name: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Reject ids that could escape the host root.
pub fn validate_key(external_id: &str) -> HostResult<()> {
    if external_id.is_empty()
        || external_id.contains('\\')
        || external_id
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(HostError::InvalidKey(external_id.to_string()));
    }
    Ok(())
}

/// Key of the metadata document stored alongside an asset.
pub fn sidecar_key(external_id: &str) -> String {
    format!("{}{}", external_id, SIDECAR_SUFFIX)
}

/// Stored format: known content types first, then the filename extension.
pub fn format_for(content_type: &str, filename: &str) -> String {
    let known = match content_type.to_lowercase().as_str() {
        "video/mp4" => Some("mp4"),
        "video/avi" | "video/x-msvideo" => Some("avi"),
        "video/quicktime" => Some("mov"),
        "video/x-ms-wmv" => Some("wmv"),
        "video/webm" => Some("webm"),
        "video/x-matroska" => Some("mkv"),
        "video/x-flv" => Some("flv"),
        "application/pdf" => Some("pdf"),
        "application/zip" => Some("zip"),
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    };

    if let Some(format) = known {
        return format.to_string();
    }

    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}
