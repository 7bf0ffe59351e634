//! Lesson media processing
//!
//! Validation and upload of lesson files, the pipeline error taxonomy, and
//! `LessonMediaService`, which turns either an upload or an external link into
//! the single `LessonMediaReference` a lesson stores.

pub mod error;
pub mod service;
pub mod upload;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::PipelineError;
pub use service::LessonMediaService;
pub use upload::{AssetUploader, UploaderOptions};
pub use validator::{ContentTypeRule, MediaValidator, ValidationError};
