//! Lesson media service
//!
//! Both ingestion paths end in the same stored value: an upload becomes
//! `LessonMediaReference::Hosted`, a pasted link becomes
//! `LessonMediaReference::External`. Playback and cleanup dispatch on it.

use bytes::Bytes;
use chrono::Utc;
use lessonmedia_core::{
    AccessPolicy, Config, ExternalVideoReference, LessonMediaReference, MediaKind, UploadMetadata,
};
use lessonmedia_links::{ExternalLinkResolver, ResolverOptions};
use lessonmedia_storage::{AssetHost, DeliveryUrlBuilder, HostError, IssueOptions, SignedUrlIssuer};
use std::sync::Arc;

use crate::error::PipelineError;
use crate::upload::{AssetUploader, UploaderOptions};

const THUMBNAIL_WIDTH: u32 = 640;
const THUMBNAIL_HEIGHT: u32 = 360;

pub struct LessonMediaService {
    uploader: AssetUploader,
    issuer: SignedUrlIssuer,
    resolver: ExternalLinkResolver,
}

impl LessonMediaService {
    pub fn new(
        uploader: AssetUploader,
        issuer: SignedUrlIssuer,
        resolver: ExternalLinkResolver,
    ) -> Self {
        Self {
            uploader,
            issuer,
            resolver,
        }
    }

    /// Wire every component from configuration.
    pub fn from_config(host: Arc<dyn AssetHost>, config: &Config) -> anyhow::Result<Self> {
        let uploader = AssetUploader::new(host, UploaderOptions::from_config(config))?;
        let issuer = SignedUrlIssuer::new(
            DeliveryUrlBuilder::new(config.delivery_base_url()),
            config.signing_secret().as_bytes().to_vec(),
        );
        let resolver = ExternalLinkResolver::new(ResolverOptions::from_config(config))?;
        Ok(Self::new(uploader, issuer, resolver))
    }

    pub fn uploader(&self) -> &AssetUploader {
        &self.uploader
    }

    pub fn issuer(&self) -> &SignedUrlIssuer {
        &self.issuer
    }

    pub fn resolver(&self) -> &ExternalLinkResolver {
        &self.resolver
    }

    pub async fn attach_upload(
        &self,
        data: Bytes,
        kind: MediaKind,
        metadata: &UploadMetadata,
    ) -> Result<LessonMediaReference, PipelineError> {
        let asset = self.uploader.upload(data, kind, metadata).await?;
        Ok(LessonMediaReference::Hosted(asset))
    }

    /// Resolve a pasted link. `None` means the link is not a recognised video
    /// link; an unreachable video still resolves, unverified.
    pub async fn attach_link(&self, raw_url: &str) -> Option<LessonMediaReference> {
        let reference = self.resolver.resolve_verified(raw_url).await?;
        if !reference.verified_reachable {
            tracing::info!(
                canonical_id = %reference.canonical_id,
                "Attached video link could not be verified"
            );
        }
        Some(LessonMediaReference::External(reference))
    }

    pub async fn refresh_verification(&self, reference: &mut ExternalVideoReference) {
        self.resolver.refresh(reference).await;
    }

    /// URL a learner's player should load.
    pub fn playback_url(&self, reference: &LessonMediaReference, options: &IssueOptions) -> String {
        match reference {
            LessonMediaReference::Hosted(asset) if asset.access_policy == AccessPolicy::Private => {
                self.issuer.issue(&asset.external_id, options).url
            }
            LessonMediaReference::Hosted(asset) => self.issuer.delivery().public_url(asset),
            LessonMediaReference::External(video) => self.resolver.embed_url(&video.canonical_id),
        }
    }

    /// Preview image, when the media has one.
    pub fn thumbnail_url(&self, reference: &LessonMediaReference, options: &IssueOptions) -> Option<String> {
        match reference {
            LessonMediaReference::Hosted(asset) => match asset.kind {
                MediaKind::Video => Some(self.issuer.issue_thumbnail_at(
                    &asset.external_id,
                    THUMBNAIL_WIDTH,
                    THUMBNAIL_HEIGHT,
                    options.expiry,
                    Utc::now(),
                )),
                MediaKind::Image => Some(self.issuer.delivery().public_url(asset)),
                MediaKind::Document => None,
            },
            LessonMediaReference::External(video) => {
                Some(self.resolver.thumbnail_url(&video.canonical_id))
            }
        }
    }

    /// Remote cleanup when the owning lesson is deleted. An asset that is
    /// already gone counts as released.
    pub async fn release(&self, reference: &LessonMediaReference) -> Result<(), PipelineError> {
        match reference {
            LessonMediaReference::Hosted(asset) => {
                match self.uploader.delete(&asset.external_id).await {
                    Err(PipelineError::Host(HostError::NotFound(_))) => {
                        tracing::debug!(external_id = %asset.external_id, "Asset already released");
                        Ok(())
                    }
                    other => other,
                }
            }
            LessonMediaReference::External(_) => Ok(()),
        }
    }
}
