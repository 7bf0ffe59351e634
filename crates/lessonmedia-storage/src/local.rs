use crate::keys::{sidecar_key, validate_key};
use crate::traits::{AssetHost, HostError, HostResult, HostUploadOptions, HostedAsset};
use crate::HostBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Local filesystem asset host
#[derive(Clone)]
pub struct LocalAssetHost {
    base_path: PathBuf,
}

impl LocalAssetHost {
    /// Create a new LocalAssetHost rooted at `base_path` (e.g. "/var/lib/lessonmedia").
    pub async fn new(base_path: impl Into<PathBuf>) -> HostResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            HostError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalAssetHost { base_path })
    }

    /// Convert an external id to a filesystem path.
    fn key_to_path(&self, key: &str) -> HostResult<PathBuf> {
        validate_key(key)?;
        let path = self.base_path.join(key);
        if !path.starts_with(&self.base_path) {
            return Err(HostError::InvalidKey(
                "Asset id resolves outside storage directory".to_string(),
            ));
        }
        Ok(path)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> HostResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn write_file(&self, path: &Path, data: &[u8], chunk_size: Option<usize>) -> HostResult<()> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            HostError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let chunk_size = chunk_size.filter(|c| *c > 0).unwrap_or(data.len().max(1));
        for chunk in data.chunks(chunk_size) {
            file.write_all(chunk).await.map_err(|e| {
                HostError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
            })?;
        }

        file.sync_all().await.map_err(|e| {
            HostError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Write `data` next to `target` under a unique temporary name.
    async fn stage(&self, target: &Path, data: &[u8], chunk_size: Option<usize>) -> HostResult<StagedFile> {
        let staged = StagedFile::next_to(target);
        self.write_file(staged.path(), data, chunk_size).await?;
        Ok(staged)
    }
}

/// A fully written file waiting to be moved into place. Removed on drop
/// unless committed, so a failed or cancelled upload leaves nothing behind.
struct StagedFile {
    path: PathBuf,
    committed: bool,
}

impl StagedFile {
    fn next_to(target: &Path) -> Self {
        let n = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut name = target.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{}-{}.partial", std::process::id(), n));
        Self {
            path: target.with_file_name(name),
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn commit(mut self, target: &Path) -> HostResult<()> {
        fs::rename(&self.path, target).await.map_err(|e| {
            HostError::UploadFailed(format!(
                "Failed to move {} into place: {}",
                target.display(),
                e
            ))
        })?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[async_trait]
impl AssetHost for LocalAssetHost {
    /// The asset and its sidecar are staged first. The sidecar is moved into
    /// place before the asset; if the asset move then fails the previous
    /// sidecar is restored, so a failed upload never replaces the stored asset.
    async fn upload(&self, data: Bytes, options: &HostUploadOptions) -> HostResult<HostedAsset> {
        let key = options.external_id();
        let path = self.key_to_path(&key)?;
        let meta_path = self.key_to_path(&sidecar_key(&key))?;
        let size = data.len();

        if !options.overwrite && fs::try_exists(&path).await? {
            return Err(HostError::AlreadyExists(key));
        }

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let hosted = HostedAsset::from_upload(options, size as u64);
        let sidecar = serde_json::to_vec_pretty(&hosted)?;

        let staged_asset = self.stage(&path, &data, options.chunk_size).await?;
        let staged_sidecar = self.stage(&meta_path, &sidecar, None).await?;

        let previous_sidecar = fs::read(&meta_path).await.ok();

        staged_sidecar.commit(&meta_path).await?;

        if let Err(e) = staged_asset.commit(&path).await {
            let restored = match previous_sidecar {
                Some(bytes) => fs::write(&meta_path, bytes).await,
                None => fs::remove_file(&meta_path).await,
            };
            if let Err(restore_err) = restored {
                tracing::error!(
                    error = %restore_err,
                    key = %key,
                    "Failed to restore asset metadata after failed upload"
                );
            }
            return Err(e);
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            chunk_size = ?options.chunk_size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local asset upload successful"
        );

        Ok(hosted)
    }

    async fn delete(&self, external_id: &str) -> HostResult<()> {
        let path = self.key_to_path(external_id)?;
        let meta_path = self.key_to_path(&sidecar_key(external_id))?;

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(HostError::NotFound(external_id.to_string()));
            }
            Err(e) => {
                return Err(HostError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        if let Err(e) = fs::remove_file(&meta_path).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(
                    error = %e,
                    path = %meta_path.display(),
                    "Failed to delete asset metadata"
                );
            }
        }

        tracing::info!(key = %external_id, "Local asset delete successful");

        Ok(())
    }

    async fn metadata(&self, external_id: &str) -> HostResult<HostedAsset> {
        let meta_path = self.key_to_path(&sidecar_key(external_id))?;

        let raw = fs::read(&meta_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => HostError::NotFound(external_id.to_string()),
            _ => HostError::IoError(e),
        })?;

        Ok(serde_json::from_slice(&raw)?)
    }

    fn backend_type(&self) -> HostBackend {
        HostBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonmedia_core::{AccessPolicy, MediaKind};

    async fn host() -> (tempfile::TempDir, LocalAssetHost) {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let host = LocalAssetHost::new(dir.path()).await.unwrap();
        (dir, host)
    }

    #[tokio::test]
    async fn upload_writes_asset_and_metadata() {
        let (dir, host) = host().await;
        let mut options =
            HostUploadOptions::new(MediaKind::Video, "lessons/videos", "abc", "video/mp4");
        options.chunk_size = Some(3);

        let hosted = host
            .upload(Bytes::from_static(b"0123456789"), &options)
            .await
            .unwrap();

        assert_eq!(hosted.external_id, "lessons/videos/abc");
        assert_eq!(hosted.byte_size, 10);
        assert_eq!(hosted.format, "mp4");
        assert_eq!(hosted.access, AccessPolicy::Private);
        let written = std::fs::read(dir.path().join("lessons/videos/abc")).unwrap();
        assert_eq!(written, b"0123456789");

        let fetched = host.metadata("lessons/videos/abc").await.unwrap();
        assert_eq!(fetched, hosted);
    }

    #[tokio::test]
    async fn overwrite_replaces_same_filename() {
        let (dir, host) = host().await;
        let mut options = HostUploadOptions::new(
            MediaKind::Document,
            "lessons/documents",
            "notes.txt",
            "text/plain",
        );
        options.overwrite = true;

        host.upload(Bytes::from_static(b"first"), &options).await.unwrap();
        host.upload(Bytes::from_static(b"second"), &options).await.unwrap();

        let written = std::fs::read(dir.path().join("lessons/documents/notes.txt")).unwrap();
        assert_eq!(written, b"second");
    }

    #[tokio::test]
    async fn existing_asset_is_kept_without_overwrite() {
        let (_dir, host) = host().await;
        let options = HostUploadOptions::new(MediaKind::Video, "lessons/videos", "abc", "video/mp4");

        host.upload(Bytes::from_static(b"first"), &options).await.unwrap();
        let err = host
            .upload(Bytes::from_static(b"second"), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, HostError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn delete_removes_asset_and_metadata() {
        let (_dir, host) = host().await;
        let options = HostUploadOptions::new(MediaKind::Image, "lessons/images", "a.png", "image/png");
        host.upload(Bytes::from_static(b"png"), &options).await.unwrap();

        host.delete("lessons/images/a.png").await.unwrap();

        assert!(matches!(
            host.metadata("lessons/images/a.png").await,
            Err(HostError::NotFound(_))
        ));
        assert!(matches!(
            host.delete("lessons/images/a.png").await,
            Err(HostError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_upload_keeps_previous_asset() {
        let (dir, host) = host().await;
        let mut options =
            HostUploadOptions::new(MediaKind::Document, "lessons/pdfs", "a.pdf", "application/pdf");
        options.overwrite = true;
        host.upload(Bytes::from_static(b"first"), &options).await.unwrap();
        let before = host.metadata("lessons/pdfs/a.pdf").await.unwrap();

        // A directory where the sidecar belongs makes the metadata move fail.
        let meta_path = dir.path().join("lessons/pdfs/a.pdf.meta.json");
        std::fs::remove_file(&meta_path).unwrap();
        std::fs::create_dir(&meta_path).unwrap();

        let result = host.upload(Bytes::from_static(b"second!!"), &options).await;
        assert!(matches!(result, Err(HostError::UploadFailed(_))));

        let on_disk = std::fs::read(dir.path().join("lessons/pdfs/a.pdf")).unwrap();
        assert_eq!(on_disk, b"first");
        assert_eq!(before.byte_size, 5);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("lessons/pdfs"))
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".partial"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn traversal_ids_are_rejected() {
        let (_dir, host) = host().await;
        let options = HostUploadOptions::new(MediaKind::Image, "..", "evil.png", "image/png");
        let err = host
            .upload(Bytes::from_static(b"x"), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, HostError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn dots_inside_a_filename_are_allowed() {
        let (dir, host) = host().await;
        let options = HostUploadOptions::new(
            MediaKind::Document,
            "lessons/pdfs",
            "intro..v2.pdf",
            "application/pdf",
        );

        let hosted = host.upload(Bytes::from_static(b"%PDF"), &options).await.unwrap();
        assert_eq!(hosted.external_id, "lessons/pdfs/intro..v2.pdf");
        assert!(dir.path().join("lessons/pdfs/intro..v2.pdf").exists());
    }
}
