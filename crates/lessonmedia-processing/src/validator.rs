use lessonmedia_core::constants::VIDEO_CONTENT_TYPES;

/// Common validation errors for lesson files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid content type: {content_type} (allowed: {allowed})")]
    InvalidContentType {
        content_type: String,
        allowed: String,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

/// Which declared content types a validator accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTypeRule {
    /// Exact, case-insensitive match against a fixed list.
    AnyOf(Vec<String>),
    /// Any type whose top-level part matches, e.g. `image/`.
    Prefix(String),
    Any,
}

impl ContentTypeRule {
    fn accepts(&self, content_type: &str) -> bool {
        let normalized = content_type.trim().to_lowercase();
        match self {
            ContentTypeRule::AnyOf(allowed) => allowed.iter().any(|ct| ct == &normalized),
            ContentTypeRule::Prefix(prefix) => {
                normalized.starts_with(prefix.as_str()) && normalized.len() > prefix.len()
            }
            ContentTypeRule::Any => true,
        }
    }

    fn describe(&self) -> String {
        match self {
            ContentTypeRule::AnyOf(allowed) => allowed.join(", "),
            ContentTypeRule::Prefix(prefix) => format!("{}*", prefix),
            ContentTypeRule::Any => "*".to_string(),
        }
    }
}

/// Lesson file validator
///
/// Runs before any asset host call; a failure here means nothing was sent.
#[derive(Debug, Clone)]
pub struct MediaValidator {
    max_file_size: usize,
    content_types: ContentTypeRule,
    filename_in_id: bool,
}

impl MediaValidator {
    pub fn new(max_file_size: usize, content_types: ContentTypeRule) -> Self {
        Self {
            max_file_size,
            content_types,
            filename_in_id: true,
        }
    }

    /// Videos are stored under a generated id; their filename is only metadata.
    pub fn video(max_file_size: usize) -> Self {
        Self {
            filename_in_id: false,
            ..Self::new(
                max_file_size,
                ContentTypeRule::AnyOf(VIDEO_CONTENT_TYPES.iter().map(|s| s.to_string()).collect()),
            )
        }
    }

    pub fn document(max_file_size: usize) -> Self {
        Self::new(max_file_size, ContentTypeRule::Any)
    }

    pub fn image(max_file_size: usize) -> Self {
        Self::new(max_file_size, ContentTypeRule::Prefix("image/".to_string()))
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        if !self.content_types.accepts(content_type) {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.content_types.describe(),
            });
        }

        Ok(())
    }

    /// Filenames become part of the asset id for documents and images, so they
    /// must be a single path segment.
    pub fn validate_filename(&self, filename: &str) -> Result<(), ValidationError> {
        if filename.trim().is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename == "."
            || filename == ".."
            || filename.chars().any(char::is_control)
        {
            return Err(ValidationError::InvalidFilename(filename.to_string()));
        }

        Ok(())
    }

    /// Validate all aspects of a file
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<(), ValidationError> {
        self.validate_file_size(file_size)?;
        if self.filename_in_id {
            self.validate_filename(filename)?;
        }
        self.validate_content_type(content_type)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonmedia_core::constants::{MAX_VIDEO_SIZE_MB, MIB};

    #[test]
    fn video_limit_is_inclusive() {
        let validator = MediaValidator::video(MAX_VIDEO_SIZE_MB * MIB);
        assert!(validator
            .validate_all("lecture.mp4", "video/mp4", MAX_VIDEO_SIZE_MB * MIB)
            .is_ok());
        assert!(matches!(
            validator.validate_all("lecture.mp4", "video/mp4", MAX_VIDEO_SIZE_MB * MIB + 1),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn video_allow_list_is_case_insensitive() {
        let validator = MediaValidator::video(MIB);
        for ct in VIDEO_CONTENT_TYPES {
            assert!(validator.validate_content_type(&ct.to_uppercase()).is_ok());
        }
        assert!(matches!(
            validator.validate_content_type("application/zip"),
            Err(ValidationError::InvalidContentType { .. })
        ));
        assert!(validator.validate_content_type("video/ogg").is_err());
    }

    #[test]
    fn documents_accept_any_type() {
        let validator = MediaValidator::document(MIB);
        assert!(validator.validate_all("bundle.zip", "application/zip", 10).is_ok());
        assert!(validator
            .validate_all("notes", "application/octet-stream", 10)
            .is_ok());
    }

    #[test]
    fn images_require_image_type() {
        let validator = MediaValidator::image(MIB);
        assert!(validator.validate_content_type("image/png").is_ok());
        assert!(validator.validate_content_type("IMAGE/JPEG").is_ok());
        assert!(validator.validate_content_type("image/").is_err());
        assert!(validator.validate_content_type("application/pdf").is_err());
    }

    #[test]
    fn empty_file_rejected() {
        let validator = MediaValidator::document(MIB);
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn filename_must_be_single_segment() {
        let validator = MediaValidator::document(MIB);
        for bad in ["", "  ", "a/b.pdf", "a\\b.pdf", "../x.pdf", "..", ".", "x\n.pdf"] {
            assert!(
                matches!(
                    validator.validate_filename(bad),
                    Err(ValidationError::InvalidFilename(_))
                ),
                "filename {:?}",
                bad
            );
        }
        assert!(validator.validate_filename("Week 1 - intro.pdf").is_ok());
        assert!(validator.validate_filename("intro..v2.pdf").is_ok());
        assert!(validator.validate_filename("..hidden.pdf").is_ok());
    }

    #[test]
    fn video_filename_is_not_part_of_the_id() {
        let validator = MediaValidator::video(MIB);
        assert!(validator.validate_all("week 1/lecture.mp4", "video/mp4", 10).is_ok());
        assert!(MediaValidator::image(MIB)
            .validate_all("week 1/cover.png", "image/png", 10)
            .is_err());
    }
}
