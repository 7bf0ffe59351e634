//! Pipeline-wide constants and defaults.

/// One mebibyte.
pub const MIB: usize = 1024 * 1024;

/// Largest video accepted by the uploader.
pub const MAX_VIDEO_SIZE_MB: usize = 500;
pub const MAX_DOCUMENT_SIZE_MB: usize = 100;
pub const MAX_IMAGE_SIZE_MB: usize = 25;

/// Chunk size used when pushing videos to the asset host.
pub const VIDEO_UPLOAD_CHUNK_SIZE_MB: usize = 20;

/// Overall budget for one video upload.
pub const VIDEO_UPLOAD_TIMEOUT_SECS: u64 = 10 * 60;

pub const SIGNED_URL_EXPIRY_SECS: u64 = 3600;
pub const LINK_VERIFY_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_VIDEO_FOLDER: &str = "lessons/videos";
pub const DEFAULT_DOCUMENT_FOLDER: &str = "lessons/documents";
pub const DEFAULT_PDF_FOLDER: &str = "lessons/pdfs";
pub const DEFAULT_IMAGE_FOLDER: &str = "lessons/images";

pub const DEFAULT_OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

/// Content types accepted for `MediaKind::Video`.
pub const VIDEO_CONTENT_TYPES: &[&str] = &[
    "video/mp4",
    "video/avi",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-ms-wmv",
    "video/webm",
    "video/x-matroska",
    "video/x-flv",
];

/// Adaptive streaming profile requested for HLS delivery.
pub const STREAMING_PROFILE: &str = "hd";
pub const STREAMING_CONTAINER: &str = "m3u8";
