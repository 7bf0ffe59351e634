//! Lesson media core library
//!
//! Domain models, error types and configuration shared by every crate of the
//! lesson media pipeline (asset upload, signed delivery, external video links).

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, MediaPipelineConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AccessPolicy, ExternalVideoReference, LessonMediaReference, MediaAsset, MediaKind,
    SignedAccessGrant, StreamingFormat, UploadMetadata, UrlShape,
};
pub use storage_types::HostBackend;
