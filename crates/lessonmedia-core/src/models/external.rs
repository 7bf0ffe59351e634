use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accepted shapes of a third-party video link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlShape {
    /// `.../watch?v=<id>`
    WatchQuery,
    /// `youtu.be/<id>`
    ShortLink,
    /// `.../embed/<id>`
    EmbedPath,
    /// The bare identifier.
    BareId,
}

/// A lesson video hosted by a third-party provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalVideoReference {
    pub canonical_id: String,
    pub source_url_shape: UrlShape,
    /// Advisory only; never blocks display.
    pub verified_reachable: bool,
    pub verified_at: Option<DateTime<Utc>>,
}

impl ExternalVideoReference {
    pub fn new(canonical_id: impl Into<String>, source_url_shape: UrlShape) -> Self {
        Self {
            canonical_id: canonical_id.into(),
            source_url_shape,
            verified_reachable: false,
            verified_at: None,
        }
    }

    /// Record the outcome of a reachability check.
    pub fn mark_verified(&mut self, reachable: bool, at: DateTime<Utc>) {
        self.verified_reachable = reachable;
        self.verified_at = Some(at);
    }
}
