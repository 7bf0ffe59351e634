use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{STREAMING_CONTAINER, STREAMING_PROFILE};

/// Streaming format a signed URL can negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamingFormat {
    /// Adaptive bitrate manifest.
    Hls,
}

impl StreamingFormat {
    pub fn profile(&self) -> &'static str {
        match self {
            StreamingFormat::Hls => STREAMING_PROFILE,
        }
    }

    pub fn container(&self) -> &'static str {
        match self {
            StreamingFormat::Hls => STREAMING_CONTAINER,
        }
    }
}

/// Time-limited access to a private asset. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAccessGrant {
    pub target_asset: String,
    pub expires_at: DateTime<Utc>,
    pub streaming_format: Option<StreamingFormat>,
}

impl SignedAccessGrant {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
