//! Segmentation events pushed to the host application.

use chrono::{DateTime, Utc};
use segment_sdk_core::{ExposingCategory, SegmentationData};
use segment_sdk_segmentation::{CallbackInfo, SegmentationDataSink};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

/// Data delivered to one host-registered callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationDataEvent {
    pub callback_id: String,
    pub category: ExposingCategory,
    pub data: SegmentationData,
    pub delivered_at: DateTime<Utc>,
}

/// Sink forwarding deliveries into the host event channel without blocking
/// the dispatcher.
pub struct HostEventSink {
    sender: mpsc::Sender<SegmentationDataEvent>,
}

impl HostEventSink {
    pub fn new(sender: mpsc::Sender<SegmentationDataEvent>) -> Self {
        Self { sender }
    }
}

impl SegmentationDataSink for HostEventSink {
    fn deliver(&self, callback: &CallbackInfo, data: &SegmentationData) {
        let event = SegmentationDataEvent {
            callback_id: callback.id.clone(),
            category: callback.exposing_category.clone(),
            data: data.clone(),
            delivered_at: Utc::now(),
        };
        if let Err(e) = self.sender.try_send(event) {
            warn!(callback_id = %callback.id, "Segmentation event dropped: {}", e);
        }
    }
}
