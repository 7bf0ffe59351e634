use lessonmedia_core::AppError;
use lessonmedia_storage::HostError;
use std::time::Duration;

use crate::validator::ValidationError;

/// Errors from the upload pipeline
///
/// No variant is retried internally. `Upload` and `Timeout` are worth
/// retrying by the caller; `Validation` is not.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Upload to asset host failed: {cause}")]
    Upload {
        #[source]
        cause: HostError,
    },

    #[error("Upload did not finish within {}s", .0.as_secs())]
    Timeout(Duration),

    /// Failure of a non-upload host call (delete, metadata lookup).
    #[error("Asset host error: {0}")]
    Host(#[source] HostError),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(e @ ValidationError::FileTooLarge { .. }) => {
                AppError::PayloadTooLarge(e.to_string())
            }
            PipelineError::Validation(e) => AppError::InvalidInput(e.to_string()),
            PipelineError::Upload { cause } => AppError::Upload(cause.to_string()),
            PipelineError::Timeout(after) => AppError::Timeout(format!(
                "Upload did not finish within {} seconds",
                after.as_secs()
            )),
            PipelineError::Host(HostError::NotFound(id)) => AppError::NotFound(id),
            PipelineError::Host(HostError::InvalidKey(id)) => {
                AppError::InvalidInput(format!("Invalid asset id: {}", id))
            }
            PipelineError::Host(HostError::ConfigError(msg)) => AppError::Configuration(msg),
            PipelineError::Host(other) => AppError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonmedia_core::ErrorMetadata;

    #[test]
    fn maps_to_http_statuses() {
        let too_large: AppError =
            PipelineError::Validation(ValidationError::FileTooLarge { size: 2, max: 1 }).into();
        assert_eq!(too_large.http_status_code(), 413);

        let bad_type: AppError = PipelineError::Validation(ValidationError::InvalidContentType {
            content_type: "application/zip".to_string(),
            allowed: "video/mp4".to_string(),
        })
        .into();
        assert_eq!(bad_type.http_status_code(), 400);

        let upload: AppError = PipelineError::Upload {
            cause: HostError::UploadFailed("connection reset".to_string()),
        }
        .into();
        assert_eq!(upload.http_status_code(), 502);

        let timeout: AppError = PipelineError::Timeout(Duration::from_secs(600)).into();
        assert_eq!(timeout.http_status_code(), 504);

        let missing: AppError =
            PipelineError::Host(HostError::NotFound("lessons/videos/x".to_string())).into();
        assert_eq!(missing.http_status_code(), 404);
    }

    #[test]
    fn timeout_message_names_budget() {
        let err = PipelineError::Timeout(Duration::from_secs(600));
        assert_eq!(err.to_string(), "Upload did not finish within 600s");
    }
}
