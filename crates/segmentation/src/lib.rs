//! Segmentation callback registry — host callbacks observing a segmentation
//! category, keyed by generated instance ids, with first-load replay of the
//! last known data.

pub mod registry;
pub mod sink;

pub use registry::{CallbackInfo, SegmentationCallbackRegistry};
pub use sink::{CaptureSink, FnSink, NoOpSink, SegmentationDataSink};
