//! Delivery targets for segmentation data.
//!
//! Every registration owns an `Arc<dyn SegmentationDataSink>`; the registry
//! calls it whenever data for the registration's category is dispatched.

use parking_lot::Mutex;
use segment_sdk_core::SegmentationData;
use std::sync::Arc;

use crate::registry::CallbackInfo;

/// Receives segmentation data for one registered callback.
pub trait SegmentationDataSink: Send + Sync {
    fn deliver(&self, callback: &CallbackInfo, data: &SegmentationData);
}

/// Sink that drops everything.
pub struct NoOpSink;

impl SegmentationDataSink for NoOpSink {
    fn deliver(&self, _callback: &CallbackInfo, _data: &SegmentationData) {}
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> SegmentationDataSink for FnSink<F>
where
    F: Fn(&CallbackInfo, &SegmentationData) + Send + Sync,
{
    fn deliver(&self, callback: &CallbackInfo, data: &SegmentationData) {
        (self.0)(callback, data)
    }
}

/// In-memory sink that captures deliveries for testing.
#[derive(Default)]
pub struct CaptureSink {
    deliveries: Mutex<Vec<(String, SegmentationData)>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
        }
    }

    /// Captured `(callback id, data)` pairs in delivery order.
    pub fn deliveries(&self) -> Vec<(String, SegmentationData)> {
        self.deliveries.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.deliveries.lock().len()
    }

    pub fn count_for(&self, callback_id: &str) -> usize {
        self.deliveries
            .lock()
            .iter()
            .filter(|(id, _)| id == callback_id)
            .count()
    }

    pub fn clear(&self) {
        self.deliveries.lock().clear();
    }
}

impl SegmentationDataSink for CaptureSink {
    fn deliver(&self, callback: &CallbackInfo, data: &SegmentationData) {
        self.deliveries
            .lock()
            .push((callback.id.clone(), data.clone()));
    }
}

/// Convenience: a sink for callbacks that only need to exist.
pub fn noop_sink() -> Arc<dyn SegmentationDataSink> {
    Arc::new(NoOpSink)
}

/// Convenience: a capture sink for tests.
pub fn capture_sink() -> Arc<CaptureSink> {
    Arc::new(CaptureSink::new())
}
