//! Lesson media infrastructure
//!
//! Tracing initialisation and the error report shape shared by every entry
//! point of the pipeline.

pub mod error;
pub mod telemetry;

pub use error::ErrorResponse;
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};
