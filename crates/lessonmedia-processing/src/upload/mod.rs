//! Upload of lesson files to the asset host.

pub mod options;
pub mod uploader;

pub use options::UploaderOptions;
pub use uploader::AssetUploader;
