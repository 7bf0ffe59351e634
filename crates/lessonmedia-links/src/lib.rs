//! External video links.
//!
//! Parses third-party (YouTube) links into a canonical identifier, checks
//! whether the video is publicly reachable and derives player and thumbnail
//! URLs from the identifier alone.

pub mod patterns;
pub mod resolver;

pub use patterns::{embed_url, extract_id, is_canonical_id, thumbnail_url, watch_url};
pub use resolver::{ExternalLinkResolver, ResolverOptions};
