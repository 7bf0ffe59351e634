//! Signed URLs for private assets.
//!
//! A signed URL is `{base}{path}?expires={unix_ts}&signature={sig}` with
//! `sig = base64url(HMAC-SHA256(secret, path || "\n" || unix_ts))`.
//! Nothing is stored: a URL stays valid until `expires`, and the expiry window
//! is the only way to bound access.

use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use lessonmedia_core::{AccessPolicy, MediaKind, SignedAccessGrant, StreamingFormat};
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;

use crate::delivery::{DeliveryPath, DeliveryUrlBuilder};

const DEFAULT_EXPIRY: Duration = Duration::from_secs(lessonmedia_core::constants::SIGNED_URL_EXPIRY_SECS);
const MIN_EXPIRY: Duration = Duration::from_secs(1);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Signed URL is malformed")]
    Malformed,

    #[error("Signed URL signature does not match")]
    InvalidSignature,

    #[error("Signed URL has expired")]
    Expired,
}

/// Options for one issued URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueOptions {
    pub expiry: Duration,
    /// Ask for the adaptive manifest instead of the raw file.
    pub streaming: bool,
}

impl Default for IssueOptions {
    fn default() -> Self {
        Self {
            expiry: DEFAULT_EXPIRY,
            streaming: false,
        }
    }
}

impl IssueOptions {
    pub fn with_expiry(expiry: Duration) -> Self {
        Self {
            expiry,
            ..Default::default()
        }
    }

    pub fn streaming() -> Self {
        Self {
            streaming: true,
            ..Default::default()
        }
    }
}

/// An issued URL and the grant it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub grant: SignedAccessGrant,
}

/// Issues and checks signed delivery URLs for private videos.
#[derive(Clone)]
pub struct SignedUrlIssuer {
    delivery: DeliveryUrlBuilder,
    secret: Vec<u8>,
}

impl std::fmt::Debug for SignedUrlIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedUrlIssuer")
            .field("delivery", &self.delivery)
            .finish_non_exhaustive()
    }
}

impl SignedUrlIssuer {
    pub fn new(delivery: DeliveryUrlBuilder, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            delivery,
            secret: secret.into(),
        }
    }

    pub fn delivery(&self) -> &DeliveryUrlBuilder {
        &self.delivery
    }

    /// Issue a URL for a private video, valid from now.
    pub fn issue(&self, external_id: &str, options: &IssueOptions) -> SignedUrl {
        self.issue_at(external_id, options, Utc::now())
    }

    /// Issue a URL as if the current time were `now`.
    ///
    /// The target is not checked: an unknown id yields a well-formed URL that
    /// the delivery layer will answer with 404.
    pub fn issue_at(&self, external_id: &str, options: &IssueOptions, now: DateTime<Utc>) -> SignedUrl {
        let mut path = DeliveryPath::new(MediaKind::Video, AccessPolicy::Private, external_id);
        let streaming_format = options.streaming.then_some(StreamingFormat::Hls);
        if let Some(format) = streaming_format {
            path = path
                .with_transformation(format!("sp_{}", format.profile()))
                .with_extension(format.container());
        }

        let (url, expires_at) = self.sign_path_at(&path, options.expiry, now);

        tracing::debug!(
            external_id = %external_id,
            expires_at = %expires_at,
            streaming = options.streaming,
            "Issued signed URL"
        );

        SignedUrl {
            url,
            grant: SignedAccessGrant {
                target_asset: external_id.to_string(),
                expires_at,
                streaming_format,
            },
        }
    }

    /// Signed still-frame URL for a private video.
    pub fn issue_thumbnail_at(
        &self,
        external_id: &str,
        width: u32,
        height: u32,
        expiry: Duration,
        now: DateTime<Utc>,
    ) -> String {
        let path = DeliveryPath::video_thumbnail(AccessPolicy::Private, external_id, width, height);
        self.sign_path_at(&path, expiry, now).0
    }

    /// Sign an arbitrary delivery path. Returns the URL and its exact expiry.
    pub fn sign_path_at(
        &self,
        path: &DeliveryPath,
        expiry: Duration,
        now: DateTime<Utc>,
    ) -> (String, DateTime<Utc>) {
        let expiry = TimeDelta::from_std(expiry.max(MIN_EXPIRY)).unwrap_or(TimeDelta::MAX);
        let expires_at = now
            .checked_add_signed(expiry)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let expires = expires_at.timestamp();

        let rendered = path.render();
        let signature = self.signature(&rendered, expires);
        let url = format!(
            "{}{}?expires={}&signature={}",
            self.delivery.base_url(),
            rendered,
            expires,
            signature
        );
        (url, expires_at)
    }

    /// Check a signed path (as rendered, without the base URL).
    pub fn verify(
        &self,
        path: &str,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        let tag = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SignatureError::Malformed)?;

        let mut mac = self.mac();
        mac.update(Self::signing_input(path, expires).as_bytes());
        mac.verify_slice(&tag)
            .map_err(|_| SignatureError::InvalidSignature)?;

        if now.timestamp() >= expires {
            return Err(SignatureError::Expired);
        }

        Ok(())
    }

    /// Check a full URL previously produced by this issuer.
    pub fn verify_url(&self, url: &str, now: DateTime<Utc>) -> Result<(), SignatureError> {
        let rest = self.delivery.strip_base(url).ok_or(SignatureError::Malformed)?;
        let (path, query) = rest.split_once('?').ok_or(SignatureError::Malformed)?;

        let mut expires = None;
        let mut signature = None;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("expires", value)) => expires = value.parse::<i64>().ok(),
                Some(("signature", value)) => signature = Some(value),
                _ => {}
            }
        }

        match (expires, signature) {
            (Some(expires), Some(signature)) => self.verify(path, expires, signature, now),
            _ => Err(SignatureError::Malformed),
        }
    }

    fn signing_input(path: &str, expires: i64) -> String {
        format!("{}\n{}", path, expires)
    }

    fn mac(&self) -> Hmac<Sha256> {
        Hmac::<Sha256>::new_from_slice(&self.secret).expect("HMAC accepts any key size")
    }

    fn signature(&self, path: &str, expires: i64) -> String {
        let mut mac = self.mac();
        mac.update(Self::signing_input(path, expires).as_bytes());
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}
