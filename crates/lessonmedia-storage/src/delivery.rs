//! Delivery URL construction.
//!
//! Path layout: `/{resource}/{delivery}/{transformation/}{external_id}{.ext}` where
//! `resource` is `video`, `raw` or `image` and `delivery` is `upload` (public) or
//! `authenticated` (private, served only with a valid signature).

use lessonmedia_core::{AccessPolicy, MediaAsset, MediaKind};

/// Transformation that makes the delivery layer answer with `Content-Disposition: attachment`.
pub const DOWNLOAD_TRANSFORMATION: &str = "fl_attachment";

/// One addressable rendition of an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPath {
    pub kind: MediaKind,
    pub access: AccessPolicy,
    pub transformation: Option<String>,
    pub external_id: String,
    pub extension: Option<String>,
}

impl DeliveryPath {
    pub fn new(kind: MediaKind, access: AccessPolicy, external_id: impl Into<String>) -> Self {
        Self {
            kind,
            access,
            transformation: None,
            external_id: external_id.into(),
            extension: None,
        }
    }

    pub fn for_asset(asset: &MediaAsset) -> Self {
        Self::new(asset.kind, asset.access_policy, asset.external_id.clone())
    }

    pub fn with_transformation(mut self, transformation: impl Into<String>) -> Self {
        self.transformation = Some(transformation.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Still frame of a video, cropped to `width` x `height`.
    pub fn video_thumbnail(
        access: AccessPolicy,
        external_id: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self::new(MediaKind::Video, access, external_id)
            .with_transformation(format!("so_0,w_{},h_{},c_fill", width, height))
            .with_extension("jpg")
    }

    /// Render the URL path, percent-encoding every id segment.
    pub fn render(&self) -> String {
        let mut path = format!(
            "/{}/{}/",
            self.kind.resource_type(),
            self.access.delivery_type()
        );
        if let Some(ref transformation) = self.transformation {
            path.push_str(transformation);
            path.push('/');
        }
        let encoded: Vec<String> = self
            .external_id
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        path.push_str(&encoded.join("/"));
        if let Some(ref extension) = self.extension {
            path.push('.');
            path.push_str(extension);
        }
        path
    }
}

/// Builds absolute delivery URLs on top of a configured base URL.
#[derive(Debug, Clone)]
pub struct DeliveryUrlBuilder {
    base_url: String,
}

impl DeliveryUrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &DeliveryPath) -> String {
        format!("{}{}", self.base_url, path.render())
    }

    /// Directly servable URL of a public asset.
    pub fn public_url(&self, asset: &MediaAsset) -> String {
        self.url(&DeliveryPath::for_asset(asset))
    }

    /// Variant of `public_url` that forces a download.
    pub fn download_url(&self, asset: &MediaAsset) -> String {
        self.url(&DeliveryPath::for_asset(asset).with_transformation(DOWNLOAD_TRANSFORMATION))
    }

    /// Strip the base URL, leaving the signed path and query.
    pub fn strip_base<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.base_url.as_str())
            .filter(|rest| rest.starts_with('/'))
    }
}
