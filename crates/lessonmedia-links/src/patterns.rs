//! Link shapes and URL derivation.
//!
//! Shapes are tried in a fixed order and the first match wins:
//! `youtube.com/watch?v=<id>`, `youtu.be/<id>`, `youtube.com/embed/<id>`, then a
//! bare id. An id is exactly 11 characters of `[A-Za-z0-9_-]` and must not run
//! on into further id characters. Host matching is case-sensitive.

use lessonmedia_core::UrlShape;
use regex::Regex;
use std::sync::LazyLock;

const EMBED_BASE: &str = "https://www.youtube.com/embed";
const WATCH_BASE: &str = "https://www.youtube.com/watch?v=";
const THUMBNAIL_BASE: &str = "https://img.youtube.com/vi";

static SHAPES: LazyLock<Vec<(UrlShape, Regex)>> = LazyLock::new(|| {
    [
        (
            UrlShape::WatchQuery,
            r"youtube\.com/watch\?v=([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
        ),
        (
            UrlShape::ShortLink,
            r"youtu\.be/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
        ),
        (
            UrlShape::EmbedPath,
            r"youtube\.com/embed/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
        ),
        (UrlShape::BareId, r"^([A-Za-z0-9_-]{11})$"),
    ]
    .into_iter()
    .map(|(shape, pattern)| (shape, Regex::new(pattern).expect("valid link pattern")))
    .collect()
});

static CANONICAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid id pattern"));

/// Extract the canonical id and the shape it was found in.
///
/// Returns `None` when no shape matches; that is an ordinary outcome.
pub fn extract_id(raw: &str) -> Option<(String, UrlShape)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    SHAPES.iter().find_map(|(shape, regex)| {
        regex
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|id| (id.as_str().to_string(), *shape))
    })
}

pub fn is_canonical_id(candidate: &str) -> bool {
    CANONICAL_ID.is_match(candidate)
}

/// Embeddable player URL.
pub fn embed_url(canonical_id: &str) -> String {
    format!("{}/{}", EMBED_BASE, canonical_id)
}

/// Highest resolution thumbnail the provider publishes.
pub fn thumbnail_url(canonical_id: &str) -> String {
    format!("{}/{}/maxresdefault.jpg", THUMBNAIL_BASE, canonical_id)
}

pub fn watch_url(canonical_id: &str) -> String {
    format!("{}{}", WATCH_BASE, canonical_id)
}
