//! Asynchronous entry points exposed to the host application.
//!
//! Each call resolves to a `BridgeResult`: the success value, or a
//! `BridgeError` carrying code, message and details.

use segment_sdk_core::config::BridgeConfig;
use segment_sdk_core::{ExposingCategory, SegmentationData};
use segment_sdk_segmentation::SegmentationCallbackRegistry;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::BridgeResult;
use crate::events::{HostEventSink, SegmentationDataEvent};

pub struct SegmentationBridge {
    registry: Arc<SegmentationCallbackRegistry>,
    events: mpsc::Sender<SegmentationDataEvent>,
}

impl SegmentationBridge {
    /// Create a bridge over `registry`. The returned receiver yields the
    /// segmentation events for callbacks registered through this bridge.
    pub fn new(
        registry: Arc<SegmentationCallbackRegistry>,
        config: &BridgeConfig,
    ) -> (Self, mpsc::Receiver<SegmentationDataEvent>) {
        // mpsc::channel panics on a zero capacity.
        let capacity = config.event_buffer_size.max(1);
        let (events, receiver) = mpsc::channel(capacity);
        info!(event_buffer_size = capacity, "Segmentation bridge initialized");
        (Self { registry, events }, receiver)
    }

    pub fn registry(&self) -> &Arc<SegmentationCallbackRegistry> {
        &self.registry
    }

    /// Register a host callback for `exposing_category`, resolving to the
    /// callback instance id.
    pub async fn register_segmentation_data_callback(
        &self,
        exposing_category: &str,
        include_first_load: bool,
    ) -> BridgeResult<String> {
        let category: ExposingCategory = exposing_category.parse()?;
        let sink = Arc::new(HostEventSink::new(self.events.clone()));
        Ok(self.registry.register(category, include_first_load, sink))
    }

    /// Unregister the host callback `callback_instance_id`. Fails with a
    /// `NOT_FOUND` error when no such callback is registered.
    pub async fn unregister_segmentation_data_callback(
        &self,
        callback_instance_id: &str,
    ) -> BridgeResult<()> {
        self.registry.unregister(callback_instance_id)?;
        Ok(())
    }

    /// Feed freshly obtained segmentation data for `category` to the
    /// registered callbacks. Resolves to the number of callbacks notified.
    pub async fn dispatch_segmentation_data(
        &self,
        category: &str,
        data: SegmentationData,
    ) -> BridgeResult<usize> {
        let category: ExposingCategory = category.parse()?;
        let notified = self.registry.dispatch(&category, data);
        debug!(category = %category, notified, "Segmentation data dispatched to host");
        Ok(notified)
    }
}
