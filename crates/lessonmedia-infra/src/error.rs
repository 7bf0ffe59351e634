//! Error report conversion
//!
//! `ErrorResponse` is what an entry point prints or returns for a failed
//! operation. Sensitive errors only expose their client message.

use lessonmedia_core::{AppError, ErrorMetadata};
use serde::Serialize;

/// Standard error report format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub status: u16,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl ErrorResponse {
    /// Build a report; `detailed` adds the error chain for non-sensitive errors.
    pub fn from_app_error(err: &AppError, detailed: bool) -> Self {
        let details = (detailed && !err.is_sensitive()).then(|| err.detailed_message());
        Self {
            error: err.client_message(),
            code: err.error_code(),
            status: err.http_status_code(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            details,
            error_type: detailed.then(|| err.error_type().to_string()),
        }
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self::from_app_error(err, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_errors_hide_details() {
        let err = AppError::Upload("bucket lessons-prod returned 403".to_string());
        let report = ErrorResponse::from_app_error(&err, true);
        assert_eq!(report.status, 502);
        assert_eq!(report.code, "UPLOAD_FAILED");
        assert!(report.recoverable);
        assert!(report.details.is_none());
        assert!(!report.error.contains("lessons-prod"));
    }

    #[test]
    fn detailed_report_for_client_errors() {
        let err = AppError::InvalidInput("Invalid content type".to_string());
        let report = ErrorResponse::from_app_error(&err, true);
        assert_eq!(report.status, 400);
        assert_eq!(report.error_type.as_deref(), Some("InvalidInput"));
        assert!(report.details.unwrap().contains("Invalid content type"));

        let json = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert!(json.get("details").is_none());
        assert_eq!(json["code"], "INVALID_INPUT");
    }
}
