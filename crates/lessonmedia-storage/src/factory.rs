#[cfg(feature = "storage-local")]
use crate::LocalAssetHost;
#[cfg(feature = "storage-s3")]
use crate::S3AssetHost;
use crate::{AssetHost, HostBackend, HostError, HostResult};
use lessonmedia_core::Config;
use std::sync::Arc;

/// Create an asset host based on configuration
pub async fn create_host(config: &Config) -> HostResult<Arc<dyn AssetHost>> {
    let backend = config.storage_backend().unwrap_or(HostBackend::S3);

    match backend {
        #[cfg(feature = "storage-s3")]
        HostBackend::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| HostError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config
                .s3_region()
                .map(String::from)
                .or_else(|| config.aws_region().map(String::from))
                .ok_or_else(|| {
                    HostError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
                })?;
            let endpoint = config.s3_endpoint().map(String::from);

            let host = S3AssetHost::new(bucket, region, endpoint).await?;
            Ok(Arc::new(host))
        }

        #[cfg(not(feature = "storage-s3"))]
        HostBackend::S3 => Err(HostError::ConfigError(
            "S3 asset host not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        HostBackend::Local => {
            let base_path = config
                .local_storage_path()
                .map(String::from)
                .ok_or_else(|| {
                    HostError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
                })?;

            let host = LocalAssetHost::new(base_path).await?;
            Ok(Arc::new(host))
        }

        #[cfg(not(feature = "storage-local"))]
        HostBackend::Local => Err(HostError::ConfigError(
            "Local asset host not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use lessonmedia_core::MediaPipelineConfig;

    #[tokio::test]
    async fn creates_local_host_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().to_string();
        let media = MediaPipelineConfig::from_lookup(|key| match key {
            "STORAGE_BACKEND" => Some("local".to_string()),
            "LOCAL_STORAGE_PATH" => Some(path.clone()),
            "DELIVERY_BASE_URL" => Some("https://media.example.com".to_string()),
            "MEDIA_SIGNING_SECRET" => Some("0123456789abcdef0123456789abcdef".to_string()),
            _ => None,
        })
        .unwrap();

        let host = create_host(&Config(Box::new(media))).await.unwrap();
        assert_eq!(host.backend_type(), HostBackend::Local);
    }
}
