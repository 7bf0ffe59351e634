//! External link resolution and reachability checks.

use anyhow::{Context, Result};
use chrono::Utc;
use lessonmedia_core::constants::{DEFAULT_OEMBED_ENDPOINT, LINK_VERIFY_TIMEOUT_SECS};
use lessonmedia_core::{Config, ExternalVideoReference};
use serde::Deserialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::patterns::{embed_url, extract_id, is_canonical_id, thumbnail_url, watch_url};

/// Every option the resolver recognises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Budget for one reachability check.
    pub verify_timeout: Duration,
    /// Provider's public oEmbed endpoint.
    pub oembed_endpoint: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            verify_timeout: Duration::from_secs(LINK_VERIFY_TIMEOUT_SECS),
            oembed_endpoint: DEFAULT_OEMBED_ENDPOINT.to_string(),
        }
    }
}

impl ResolverOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            verify_timeout: config.link_verify_timeout(),
            oembed_endpoint: config.oembed_endpoint().to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.verify_timeout.is_zero() {
            anyhow::bail!("Link verification timeout must be greater than zero");
        }
        if !self.oembed_endpoint.starts_with("http://") && !self.oembed_endpoint.starts_with("https://") {
            anyhow::bail!("oEmbed endpoint must start with http:// or https://");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    #[serde(default)]
    title: Option<String>,
}

/// Resolves third-party video links to canonical references.
pub struct ExternalLinkResolver {
    http_client: reqwest::Client,
    options: ResolverOptions,
}

impl Debug for ExternalLinkResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExternalLinkResolver")
            .field("options", &self.options)
            .finish()
    }
}

impl ExternalLinkResolver {
    pub fn new(options: ResolverOptions) -> Result<Self> {
        options.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(options.verify_timeout)
            .build()
            .context("Failed to create HTTP client for link verification")?;

        Ok(Self {
            http_client,
            options,
        })
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Parse a raw link. The returned reference is not yet verified.
    pub fn resolve(&self, raw_url: &str) -> Option<ExternalVideoReference> {
        let (canonical_id, shape) = extract_id(raw_url)?;
        Some(ExternalVideoReference::new(canonical_id, shape))
    }

    /// Parse a raw link and record a best-effort reachability check.
    pub async fn resolve_verified(&self, raw_url: &str) -> Option<ExternalVideoReference> {
        let mut reference = self.resolve(raw_url)?;
        self.refresh(&mut reference).await;
        Some(reference)
    }

    /// Re-run the reachability check for an existing reference.
    pub async fn refresh(&self, reference: &mut ExternalVideoReference) {
        let reachable = self.verify(&reference.canonical_id).await;
        reference.mark_verified(reachable, Utc::now());
    }

    /// Ask the provider whether the video is publicly reachable.
    ///
    /// Never errors: network failures, non-200 answers and answers without a
    /// title all count as "not verified".
    pub async fn verify(&self, canonical_id: &str) -> bool {
        if !is_canonical_id(canonical_id) {
            return false;
        }

        let start = std::time::Instant::now();
        let watch = watch_url(canonical_id);

        let response = match self
            .http_client
            .get(&self.options.oembed_endpoint)
            .query(&[("url", watch.as_str()), ("format", "json")])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    canonical_id = %canonical_id,
                    timed_out = e.is_timeout(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Video link verification request failed"
                );
                return false;
            }
        };

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::debug!(
                canonical_id = %canonical_id,
                status = %status,
                "Video link not verified"
            );
            return false;
        }

        let verified = match response.json::<OEmbedResponse>().await {
            Ok(body) => body.title.is_some_and(|title| !title.trim().is_empty()),
            Err(e) => {
                tracing::debug!(error = %e, canonical_id = %canonical_id, "Malformed oEmbed response");
                false
            }
        };

        tracing::debug!(
            canonical_id = %canonical_id,
            verified,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video link verification finished"
        );

        verified
    }

    pub fn embed_url(&self, canonical_id: &str) -> String {
        embed_url(canonical_id)
    }

    pub fn thumbnail_url(&self, canonical_id: &str) -> String {
        thumbnail_url(canonical_id)
    }
}
