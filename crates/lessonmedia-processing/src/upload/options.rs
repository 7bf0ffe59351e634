use lessonmedia_core::constants::{
    DEFAULT_DOCUMENT_FOLDER, DEFAULT_IMAGE_FOLDER, DEFAULT_PDF_FOLDER, DEFAULT_VIDEO_FOLDER,
    MAX_DOCUMENT_SIZE_MB, MAX_IMAGE_SIZE_MB, MAX_VIDEO_SIZE_MB, MIB, VIDEO_UPLOAD_CHUNK_SIZE_MB,
    VIDEO_UPLOAD_TIMEOUT_SECS,
};
use lessonmedia_core::{Config, MediaKind};
use std::time::Duration;

use crate::validator::MediaValidator;

/// Every option the uploader recognises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderOptions {
    pub max_video_size_bytes: usize,
    pub max_document_size_bytes: usize,
    pub max_image_size_bytes: usize,
    pub video_chunk_size_bytes: usize,
    pub video_upload_timeout: Duration,
    pub video_folder: String,
    pub document_folder: String,
    pub pdf_folder: String,
    pub image_folder: String,
}

impl Default for UploaderOptions {
    fn default() -> Self {
        Self {
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * MIB,
            max_document_size_bytes: MAX_DOCUMENT_SIZE_MB * MIB,
            max_image_size_bytes: MAX_IMAGE_SIZE_MB * MIB,
            video_chunk_size_bytes: VIDEO_UPLOAD_CHUNK_SIZE_MB * MIB,
            video_upload_timeout: Duration::from_secs(VIDEO_UPLOAD_TIMEOUT_SECS),
            video_folder: DEFAULT_VIDEO_FOLDER.to_string(),
            document_folder: DEFAULT_DOCUMENT_FOLDER.to_string(),
            pdf_folder: DEFAULT_PDF_FOLDER.to_string(),
            image_folder: DEFAULT_IMAGE_FOLDER.to_string(),
        }
    }
}

impl UploaderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_video_size_bytes: config.max_video_size_bytes(),
            max_document_size_bytes: config.max_document_size_bytes(),
            max_image_size_bytes: config.max_image_size_bytes(),
            video_chunk_size_bytes: config.video_chunk_size_bytes(),
            video_upload_timeout: config.video_upload_timeout(),
            video_folder: config.video_folder().to_string(),
            document_folder: config.document_folder().to_string(),
            pdf_folder: config.pdf_folder().to_string(),
            image_folder: config.image_folder().to_string(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_video_size_bytes == 0
            || self.max_document_size_bytes == 0
            || self.max_image_size_bytes == 0
        {
            anyhow::bail!("Upload size limits must be greater than zero");
        }
        if self.video_chunk_size_bytes == 0 {
            anyhow::bail!("Video chunk size must be greater than zero");
        }
        if self.video_upload_timeout.is_zero() {
            anyhow::bail!("Video upload timeout must be greater than zero");
        }
        for (name, folder) in [
            ("video", &self.video_folder),
            ("document", &self.document_folder),
            ("pdf", &self.pdf_folder),
            ("image", &self.image_folder),
        ] {
            if folder.contains("..") || folder.contains('\\') {
                anyhow::bail!("Invalid {} folder: {}", name, folder);
            }
        }
        Ok(())
    }

    /// Validator for a declared kind, sized by these options.
    pub fn validator_for(&self, kind: MediaKind) -> MediaValidator {
        match kind {
            MediaKind::Video => MediaValidator::video(self.max_video_size_bytes),
            MediaKind::Document => MediaValidator::document(self.max_document_size_bytes),
            MediaKind::Image => MediaValidator::image(self.max_image_size_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = UploaderOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.video_chunk_size_bytes, 20 * MIB);
        assert_eq!(options.video_upload_timeout, Duration::from_secs(600));
        assert_eq!(options.validator_for(MediaKind::Video).max_file_size(), 500 * MIB);
    }

    #[test]
    fn rejects_zero_and_traversal() {
        let zero_chunk = UploaderOptions {
            video_chunk_size_bytes: 0,
            ..Default::default()
        };
        assert!(zero_chunk.validate().is_err());

        let traversal = UploaderOptions {
            pdf_folder: "../pdfs".to_string(),
            ..Default::default()
        };
        assert!(traversal.validate().is_err());
    }
}
