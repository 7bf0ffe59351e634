//! In-memory asset host for testing
//!
//! Records every call so tests can assert how many round trips were made.

use async_trait::async_trait;
use bytes::Bytes;
use lessonmedia_core::HostBackend;
use lessonmedia_storage::{AssetHost, HostError, HostResult, HostUploadOptions, HostedAsset};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
pub struct RecordingHost {
    assets: Arc<Mutex<HashMap<String, HostedAsset>>>,
    uploads: Arc<Mutex<Vec<HostUploadOptions>>>,
    upload_calls: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
    fail_uploads: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every upload sleeps this long before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Every upload fails as an unreachable host would.
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn last_upload(&self) -> Option<HostUploadOptions> {
        self.uploads.lock().unwrap().last().cloned()
    }

    pub fn contains(&self, external_id: &str) -> bool {
        self.assets.lock().unwrap().contains_key(external_id)
    }
}

#[async_trait]
impl AssetHost for RecordingHost {
    async fn upload(&self, data: Bytes, options: &HostUploadOptions) -> HostResult<HostedAsset> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.uploads.lock().unwrap().push(options.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_uploads {
            return Err(HostError::UploadFailed("host unreachable".to_string()));
        }

        let external_id = options.external_id();
        let mut assets = self.assets.lock().unwrap();
        if !options.overwrite && assets.contains_key(&external_id) {
            return Err(HostError::AlreadyExists(external_id));
        }
        let hosted = HostedAsset::from_upload(options, data.len() as u64);
        assets.insert(external_id, hosted.clone());
        Ok(hosted)
    }

    async fn delete(&self, external_id: &str) -> HostResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.assets
            .lock()
            .unwrap()
            .remove(external_id)
            .map(|_| ())
            .ok_or_else(|| HostError::NotFound(external_id.to_string()))
    }

    async fn metadata(&self, external_id: &str) -> HostResult<HostedAsset> {
        self.assets
            .lock()
            .unwrap()
            .get(external_id)
            .cloned()
            .ok_or_else(|| HostError::NotFound(external_id.to_string()))
    }

    fn backend_type(&self) -> HostBackend {
        HostBackend::Local
    }
}
