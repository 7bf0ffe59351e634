use serde::{Deserialize, Serialize};

use super::{ExternalVideoReference, MediaAsset};

/// The media a lesson points at, whichever ingestion path produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum LessonMediaReference {
    Hosted(MediaAsset),
    External(ExternalVideoReference),
}

impl LessonMediaReference {
    pub fn as_hosted(&self) -> Option<&MediaAsset> {
        match self {
            LessonMediaReference::Hosted(asset) => Some(asset),
            LessonMediaReference::External(_) => None,
        }
    }

    pub fn as_external(&self) -> Option<&ExternalVideoReference> {
        match self {
            LessonMediaReference::External(reference) => Some(reference),
            LessonMediaReference::Hosted(_) => None,
        }
    }
}
