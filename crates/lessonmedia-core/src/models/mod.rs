mod asset;
mod external;
mod grant;
mod lesson;

pub use asset::{AccessPolicy, MediaAsset, MediaKind, UploadMetadata};
pub use external::{ExternalVideoReference, UrlShape};
pub use grant::{SignedAccessGrant, StreamingFormat};
pub use lesson::LessonMediaReference;
