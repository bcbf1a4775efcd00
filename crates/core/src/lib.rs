//! Shared building blocks for the segmentation SDK: errors, configuration
//! and the segmentation data model exchanged with host applications.

pub mod config;
pub mod error;
pub mod segments;

pub use config::SdkConfig;
pub use error::{SdkError, SdkResult};
pub use segments::{ExposingCategory, Segment, SegmentationData};
