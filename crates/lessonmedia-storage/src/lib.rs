//! Lesson media storage library
//!
//! The asset hosting boundary of the pipeline: the `AssetHost` trait with S3 and
//! local filesystem implementations, delivery URL construction and signed URL
//! issuance for private assets.
//!
//! # External id format
//!
//! Asset ids are `{folder}/{name}`. Videos get a generated name; documents and
//! images keep their original filename, so a second upload with the same name
//! replaces the first. Ids must not contain `..` or a leading `/`.

pub mod delivery;
pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signing;
pub mod traits;

// Re-export commonly used types
pub use delivery::{DeliveryPath, DeliveryUrlBuilder};
pub use factory::create_host;
pub use keys::format_for;
pub use lessonmedia_core::HostBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalAssetHost;
#[cfg(feature = "storage-s3")]
pub use s3::S3AssetHost;
pub use signing::{IssueOptions, SignatureError, SignedUrl, SignedUrlIssuer};
pub use traits::{AssetHost, HostError, HostResult, HostUploadOptions, HostedAsset};
