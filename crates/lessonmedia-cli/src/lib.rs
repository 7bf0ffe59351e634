//! Helpers for the `lessonmedia` binary.

use anyhow::Context;
use bytes::Bytes;
use lessonmedia_core::{AppError, UploadMetadata};
use lessonmedia_infra::ErrorResponse;
use serde::Serialize;
use std::path::Path;

/// Content type guessed from a file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "wmv" => "video/x-ms-wmv",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "flv" => "video/x-flv",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}

/// Read a local file and describe it for upload.
pub async fn read_upload(
    path: &Path,
    content_type: Option<String>,
    alt_text: Option<String>,
    caption: Option<String>,
) -> anyhow::Result<(Bytes, UploadMetadata)> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Path has no usable filename: {}", path.display()))?;

    let content_type = content_type.unwrap_or_else(|| content_type_for(path).to_string());
    let mut metadata = UploadMetadata::new(filename, content_type);
    metadata.alt_text = alt_text;
    metadata.caption = caption;
    Ok((Bytes::from(data), metadata))
}

pub fn render_json(value: &impl Serialize) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("Serialize response")
}

/// Command output is the only thing written to stdout.
pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", render_json(value)?);
    Ok(())
}

/// Print an error report to stderr and hand back an error for the exit code.
pub fn report_failure(err: impl Into<AppError>, detailed: bool) -> anyhow::Error {
    let err = err.into();
    let report = ErrorResponse::from_app_error(&err, detailed);
    match serde_json::to_string_pretty(&report) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{}", err),
    }
    anyhow::anyhow!("{} ({})", report.error, report.code)
}
