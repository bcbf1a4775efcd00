//! Host bridge for the segmentation SDK — the asynchronous entry points a
//! mobile host (iOS, Android, React Native, Flutter) calls to observe
//! segmentation data, plus the event channel that carries data back.

pub mod bridge;
pub mod error;
pub mod events;

pub use bridge::SegmentationBridge;
pub use error::{BridgeError, BridgeResult};
pub use events::{HostEventSink, SegmentationDataEvent};
