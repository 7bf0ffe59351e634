//! `AssetUploader`: validates a lesson file and pushes it to the asset host.
//!
//! Videos go to the video folder under a generated id, private, in fixed-size
//! chunks and under an overall timeout. Documents and images are public and keep
//! their filename, so uploading the same filename again replaces the asset.
//! PDFs have their own folder and default alt text and caption.

use bytes::Bytes;
use lessonmedia_core::{MediaAsset, MediaKind, UploadMetadata};
use lessonmedia_storage::{AssetHost, HostUploadOptions};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::upload::options::UploaderOptions;

const CONTEXT_ALT: &str = "alt";
const CONTEXT_CAPTION: &str = "caption";

pub struct AssetUploader {
    host: Arc<dyn AssetHost>,
    options: UploaderOptions,
}

impl AssetUploader {
    pub fn new(host: Arc<dyn AssetHost>, options: UploaderOptions) -> anyhow::Result<Self> {
        options.validate()?;
        Ok(Self { host, options })
    }

    pub fn options(&self) -> &UploaderOptions {
        &self.options
    }

    /// Upload one lesson file. Exactly one host call is made when validation
    /// passes, none otherwise.
    #[tracing::instrument(
        skip_all,
        fields(kind = %kind, filename = %metadata.filename, size_bytes = data.len())
    )]
    pub async fn upload(
        &self,
        data: Bytes,
        kind: MediaKind,
        metadata: &UploadMetadata,
    ) -> Result<MediaAsset, PipelineError> {
        let validator = self.options.validator_for(kind);
        if let Err(e) = validator.validate_all(&metadata.filename, &metadata.content_type, data.len()) {
            tracing::debug!(error = %e, content_type = %metadata.content_type, "Rejected lesson file");
            return Err(e.into());
        }

        let host_options = self.host_options(kind, metadata);
        let external_id = host_options.external_id();
        let start = Instant::now();

        let result = match kind {
            MediaKind::Video => {
                let budget = self.options.video_upload_timeout;
                match tokio::time::timeout(budget, self.host.upload(data, &host_options)).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(
                            external_id = %external_id,
                            timeout_secs = budget.as_secs(),
                            "Video upload timed out"
                        );
                        return Err(PipelineError::Timeout(budget));
                    }
                }
            }
            MediaKind::Document | MediaKind::Image => self.host.upload(data, &host_options).await,
        };

        let hosted = result.map_err(|cause| {
            tracing::error!(
                error = %cause,
                external_id = %external_id,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Upload to asset host failed"
            );
            PipelineError::Upload { cause }
        })?;

        tracing::info!(
            external_id = %hosted.external_id,
            access = %hosted.access,
            format = %hosted.format,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Lesson file uploaded"
        );

        Ok(hosted.into_media_asset())
    }

    /// Remove an asset from the host.
    pub async fn delete(&self, external_id: &str) -> Result<(), PipelineError> {
        self.host.delete(external_id).await.map_err(|e| {
            tracing::warn!(error = %e, external_id = %external_id, "Failed to delete asset");
            PipelineError::Host(e)
        })?;
        tracing::info!(external_id = %external_id, "Asset deleted");
        Ok(())
    }

    /// Metadata of a stored asset.
    pub async fn fetch(&self, external_id: &str) -> Result<MediaAsset, PipelineError> {
        let hosted = self
            .host
            .metadata(external_id)
            .await
            .map_err(PipelineError::Host)?;
        Ok(hosted.into_media_asset())
    }

    fn host_options(&self, kind: MediaKind, metadata: &UploadMetadata) -> HostUploadOptions {
        let mut options = match kind {
            MediaKind::Video => {
                let mut options = HostUploadOptions::new(
                    kind,
                    &self.options.video_folder,
                    Uuid::new_v4().to_string(),
                    &metadata.content_type,
                );
                options.chunk_size = Some(self.options.video_chunk_size_bytes);
                options
            }
            MediaKind::Document | MediaKind::Image => {
                let folder = match kind {
                    MediaKind::Image => &self.options.image_folder,
                    _ if metadata.is_pdf() => &self.options.pdf_folder,
                    _ => &self.options.document_folder,
                };
                let mut options =
                    HostUploadOptions::new(kind, folder, &metadata.filename, &metadata.content_type);
                options.overwrite = true;
                options
            }
        };

        options.filename = metadata.filename.clone();
        options.duration_seconds = metadata.duration_seconds;
        options.width = metadata.width;
        options.height = metadata.height;

        let pdf = kind == MediaKind::Document && metadata.is_pdf();
        let alt = metadata
            .alt_text
            .clone()
            .or_else(|| pdf.then(|| metadata.filename.clone()));
        let caption = metadata
            .caption
            .clone()
            .or_else(|| pdf.then(|| metadata.stem().to_string()));
        if let Some(alt) = alt {
            options.context.insert(CONTEXT_ALT.to_string(), alt);
        }
        if let Some(caption) = caption {
            options.context.insert(CONTEXT_CAPTION.to_string(), caption);
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::RecordingHost;
    use crate::validator::ValidationError;
    use lessonmedia_core::AccessPolicy;
    use lessonmedia_storage::HostError;
    use std::time::Duration;

    fn uploader(host: &RecordingHost, options: UploaderOptions) -> AssetUploader {
        AssetUploader::new(Arc::new(host.clone()), options).unwrap()
    }

    #[tokio::test]
    async fn oversized_video_never_reaches_host() {
        let host = RecordingHost::new();
        let uploader = uploader(
            &host,
            UploaderOptions {
                max_video_size_bytes: 1024,
                ..Default::default()
            },
        );

        let result = uploader
            .upload(
                Bytes::from(vec![0u8; 1025]),
                MediaKind::Video,
                &UploadMetadata::new("lecture.mp4", "video/mp4"),
            )
            .await;

        assert!(matches!(
            result,
            Err(PipelineError::Validation(ValidationError::FileTooLarge { size: 1025, max: 1024 }))
        ));
        assert_eq!(host.upload_calls(), 0);
    }

    #[tokio::test]
    async fn zip_rejected_as_video_accepted_as_document() {
        let host = RecordingHost::new();
        let uploader = uploader(&host, UploaderOptions::default());
        let meta = UploadMetadata::new("bundle.zip", "application/zip");

        let as_video = uploader
            .upload(Bytes::from_static(b"PK\x03\x04"), MediaKind::Video, &meta)
            .await;
        assert!(matches!(as_video, Err(PipelineError::Validation(_))));
        assert_eq!(host.upload_calls(), 0);

        let asset = uploader
            .upload(Bytes::from_static(b"PK\x03\x04"), MediaKind::Document, &meta)
            .await
            .unwrap();
        assert_eq!(asset.external_id, "lessons/documents/bundle.zip");
        assert_eq!(asset.access_policy, AccessPolicy::Public);
        assert_eq!(asset.format, "zip");
        assert_eq!(host.upload_calls(), 1);
    }

    #[tokio::test]
    async fn video_is_private_chunked_and_uniquely_named() {
        let host = RecordingHost::new();
        let uploader = uploader(&host, UploaderOptions::default());
        let meta = UploadMetadata::new("lecture.mp4", "video/mp4");

        let first = uploader
            .upload(Bytes::from_static(b"video"), MediaKind::Video, &meta)
            .await
            .unwrap();
        let options = host.last_upload().unwrap();
        let second = uploader
            .upload(Bytes::from_static(b"video"), MediaKind::Video, &meta)
            .await
            .unwrap();

        assert!(first.is_private());
        assert!(first.external_id.starts_with("lessons/videos/"));
        assert_ne!(first.external_id, second.external_id);
        assert_eq!(options.chunk_size, Some(20 * 1024 * 1024));
        assert!(!options.overwrite);
        assert_eq!(first.format, "mp4");
    }

    #[tokio::test]
    async fn slow_video_upload_times_out() {
        let host = RecordingHost::with_delay(Duration::from_millis(500));
        let uploader = uploader(
            &host,
            UploaderOptions {
                video_upload_timeout: Duration::from_millis(50),
                ..Default::default()
            },
        );

        let result = uploader
            .upload(
                Bytes::from_static(b"video"),
                MediaKind::Video,
                &UploadMetadata::new("lecture.webm", "video/webm"),
            )
            .await;

        assert!(matches!(result, Err(PipelineError::Timeout(d)) if d == Duration::from_millis(50)));
        assert_eq!(host.upload_calls(), 1);
    }

    #[tokio::test]
    async fn host_failure_surfaces_as_upload_error() {
        let host = RecordingHost::failing();
        let uploader = uploader(&host, UploaderOptions::default());

        let result = uploader
            .upload(
                Bytes::from_static(b"%PDF"),
                MediaKind::Document,
                &UploadMetadata::new("syllabus.pdf", "application/pdf"),
            )
            .await;

        assert!(matches!(
            result,
            Err(PipelineError::Upload { cause: HostError::UploadFailed(_) })
        ));
        assert_eq!(host.upload_calls(), 1);
    }

    #[tokio::test]
    async fn pdf_goes_to_pdf_folder_with_context() {
        let host = RecordingHost::new();
        let uploader = uploader(&host, UploaderOptions::default());

        let asset = uploader
            .upload(
                Bytes::from_static(b"%PDF-1.7"),
                MediaKind::Document,
                &UploadMetadata::new("Week 1 syllabus.pdf", "application/pdf"),
            )
            .await
            .unwrap();

        assert_eq!(asset.external_id, "lessons/pdfs/Week 1 syllabus.pdf");
        let options = host.last_upload().unwrap();
        assert!(options.overwrite);
        assert_eq!(options.context.get("alt").map(String::as_str), Some("Week 1 syllabus.pdf"));
        assert_eq!(options.context.get("caption").map(String::as_str), Some("Week 1 syllabus"));
    }

    #[tokio::test]
    async fn supplied_context_wins_over_pdf_defaults() {
        let host = RecordingHost::new();
        let uploader = uploader(&host, UploaderOptions::default());
        let mut meta = UploadMetadata::new("notes.pdf", "application/pdf");
        meta.alt_text = Some("Lecture notes".to_string());

        uploader
            .upload(Bytes::from_static(b"%PDF"), MediaKind::Document, &meta)
            .await
            .unwrap();

        let options = host.last_upload().unwrap();
        assert_eq!(options.context.get("alt").map(String::as_str), Some("Lecture notes"));
        assert_eq!(options.context.get("caption").map(String::as_str), Some("notes"));
    }

    #[tokio::test]
    async fn same_filename_overwrites() {
        let host = RecordingHost::new();
        let uploader = uploader(&host, UploaderOptions::default());
        let meta = UploadMetadata::new("diagram.png", "image/png");

        let first = uploader
            .upload(Bytes::from_static(b"one"), MediaKind::Image, &meta)
            .await
            .unwrap();
        let second = uploader
            .upload(Bytes::from_static(b"second"), MediaKind::Image, &meta)
            .await
            .unwrap();

        assert_eq!(first.external_id, "lessons/images/diagram.png");
        assert_eq!(first.external_id, second.external_id);
        assert_eq!(uploader.fetch(&second.external_id).await.unwrap().byte_size, 6);
    }

    #[tokio::test]
    async fn image_requires_image_type() {
        let host = RecordingHost::new();
        let uploader = uploader(&host, UploaderOptions::default());

        let result = uploader
            .upload(
                Bytes::from_static(b"data"),
                MediaKind::Image,
                &UploadMetadata::new("diagram.pdf", "application/pdf"),
            )
            .await;
        assert!(matches!(result, Err(PipelineError::Validation(_))));
        assert_eq!(host.upload_calls(), 0);
    }

    #[tokio::test]
    async fn delete_and_fetch_pass_through() {
        let host = RecordingHost::new();
        let uploader = uploader(&host, UploaderOptions::default());
        let asset = uploader
            .upload(
                Bytes::from_static(b"text"),
                MediaKind::Document,
                &UploadMetadata::new("readme.txt", "text/plain"),
            )
            .await
            .unwrap();

        assert_eq!(uploader.fetch(&asset.external_id).await.unwrap(), asset);
        uploader.delete(&asset.external_id).await.unwrap();
        assert!(!host.contains(&asset.external_id));
        assert!(matches!(
            uploader.delete(&asset.external_id).await,
            Err(PipelineError::Host(HostError::NotFound(_)))
        ));
    }
}
