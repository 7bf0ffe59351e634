use crate::keys::{sidecar_key, validate_key};
use crate::traits::{AssetHost, HostError, HostResult, HostUploadOptions, HostedAsset};
use crate::HostBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult, WriteMultipart};

/// Parts uploaded concurrently by one chunked upload.
const MAX_PARTS_IN_FLIGHT: usize = 4;

/// S3 asset host
#[derive(Clone)]
pub struct S3AssetHost {
    store: AmazonS3,
    bucket: String,
}

impl S3AssetHost {
    /// Create a new S3AssetHost instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> HostResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| HostError::ConfigError(e.to_string()))?;

        Ok(S3AssetHost { store, bucket })
    }

    async fn put_single(&self, location: &Path, data: Bytes) -> ObjectResult<()> {
        self.store.put(location, PutPayload::from(data)).await?;
        Ok(())
    }

    /// Push `data` as a multipart upload of `chunk_size` parts. A failed part
    /// aborts the upload. An upload dropped mid-flight (timeout) stays
    /// incomplete on the bucket and never becomes visible as the object.
    async fn put_chunked(&self, location: &Path, data: &[u8], chunk_size: usize) -> ObjectResult<()> {
        let upload = self.store.put_multipart(location).await?;
        let mut writer = WriteMultipart::new_with_chunk_size(upload, chunk_size);

        let mut written = Ok(());
        for chunk in data.chunks(chunk_size) {
            written = writer.wait_for_capacity(MAX_PARTS_IN_FLIGHT).await;
            if written.is_err() {
                break;
            }
            writer.write(chunk);
        }
        if written.is_ok() {
            written = writer.wait_for_capacity(0).await;
        }

        if let Err(e) = written {
            if let Err(abort_err) = writer.abort().await {
                tracing::warn!(
                    error = %abort_err,
                    bucket = %self.bucket,
                    key = %location,
                    "Failed to abort multipart upload"
                );
            }
            return Err(e);
        }

        writer.finish().await?;
        Ok(())
    }

    async fn read_optional(&self, location: &Path) -> HostResult<Option<Bytes>> {
        match self.store.get(location).await {
            Ok(result) => result
                .bytes()
                .await
                .map(Some)
                .map_err(|e| HostError::BackendError(e.to_string())),
            Err(ObjectStoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(HostError::BackendError(e.to_string())),
        }
    }

    /// Put back the sidecar that described the asset before a failed upload.
    async fn restore_sidecar(&self, location: &Path, previous: Option<Bytes>) {
        let restored = match previous {
            Some(bytes) => self.put_single(location, bytes).await,
            None => self.store.delete(location).await,
        };
        if let Err(e) = restored {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %location,
                "Failed to restore asset metadata after failed upload"
            );
        }
    }

    async fn exists(&self, location: &Path) -> HostResult<bool> {
        match self.store.head(location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(HostError::BackendError(e.to_string())),
        }
    }
}

#[async_trait]
impl AssetHost for S3AssetHost {
    async fn upload(&self, data: Bytes, options: &HostUploadOptions) -> HostResult<HostedAsset> {
        let key = options.external_id();
        validate_key(&key)?;
        let location = Path::from(key.clone());
        let size = data.len();

        if !options.overwrite && self.exists(&location).await? {
            return Err(HostError::AlreadyExists(key));
        }

        let start = std::time::Instant::now();

        // Sidecar first: the asset object is only replaced once its own put
        // completes, and a failed put restores the previous sidecar.
        let hosted = HostedAsset::from_upload(options, size as u64);
        let sidecar_location = Path::from(sidecar_key(&key));
        let previous_sidecar = self.read_optional(&sidecar_location).await?;
        let sidecar = Bytes::from(serde_json::to_vec(&hosted)?);
        self.put_single(&sidecar_location, sidecar)
            .await
            .map_err(|e| HostError::UploadFailed(format!("Failed to store metadata: {}", e)))?;

        let result = match options.chunk_size {
            Some(chunk_size) if chunk_size > 0 && size > chunk_size => {
                self.put_chunked(&location, &data, chunk_size).await
            }
            _ => self.put_single(&location, data).await,
        };

        if let Err(e) = result {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 asset upload failed"
            );
            self.restore_sidecar(&sidecar_location, previous_sidecar).await;
            return Err(HostError::UploadFailed(e.to_string()));
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            chunk_size = ?options.chunk_size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 asset upload successful"
        );

        Ok(hosted)
    }

    async fn delete(&self, external_id: &str) -> HostResult<()> {
        validate_key(external_id)?;
        let start = std::time::Instant::now();
        let location = Path::from(external_id.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => HostError::NotFound(external_id.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %external_id,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 asset delete failed"
                );
                HostError::DeleteFailed(other.to_string())
            }
        })?;

        let sidecar = Path::from(sidecar_key(external_id));
        if let Err(e) = self.store.delete(&sidecar).await {
            tracing::warn!(error = %e, key = %external_id, "Failed to delete asset metadata");
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %external_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 asset delete successful"
        );

        Ok(())
    }

    async fn metadata(&self, external_id: &str) -> HostResult<HostedAsset> {
        validate_key(external_id)?;
        let location = Path::from(sidecar_key(external_id));

        let result = self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => HostError::NotFound(external_id.to_string()),
            other => HostError::BackendError(other.to_string()),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| HostError::BackendError(e.to_string()))?;

        Ok(serde_json::from_slice(&bytes)?)
    }

    fn backend_type(&self) -> HostBackend {
        HostBackend::S3
    }
}
