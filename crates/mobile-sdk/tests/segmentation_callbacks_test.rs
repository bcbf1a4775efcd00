//! End-to-end tests of the host bridge over a shared callback registry.

use segment_sdk_core::config::BridgeConfig;
use segment_sdk_core::{ExposingCategory, Segment, SegmentationData};
use segment_sdk_mobile::SegmentationBridge;
use segment_sdk_segmentation::{sink::capture_sink, SegmentationCallbackRegistry};
use std::collections::HashSet;
use std::sync::Arc;

fn discovery_data() -> SegmentationData {
    SegmentationData::new(vec![
        Segment::new("66c6a1", "66c6a0"),
        Segment::new("77d7b1", "77d7b0"),
    ])
}

#[tokio::test]
async fn first_load_replays_to_late_host_callback() {
    let registry = Arc::new(SegmentationCallbackRegistry::new());
    let (bridge, mut rx) = SegmentationBridge::new(registry.clone(), &BridgeConfig::default());

    bridge
        .dispatch_segmentation_data("discovery", discovery_data())
        .await
        .unwrap();
    assert!(rx.try_recv().is_err());

    let eager = bridge
        .register_segmentation_data_callback("discovery", true)
        .await
        .unwrap();
    bridge
        .register_segmentation_data_callback("discovery", false)
        .await
        .unwrap();

    let event = rx.recv().await.unwrap();
    assert_eq!(event.callback_id, eager);
    assert_eq!(event.category, ExposingCategory::Discovery);
    assert_eq!(event.data, discovery_data());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn bridge_and_native_callbacks_share_registry() {
    let registry = Arc::new(SegmentationCallbackRegistry::new());
    let (bridge, mut rx) = SegmentationBridge::new(registry.clone(), &BridgeConfig::default());

    let native = capture_sink();
    let native_id = registry.register(ExposingCategory::Content, false, native.clone());
    let host_id = bridge
        .register_segmentation_data_callback("content", false)
        .await
        .unwrap();
    assert_eq!(registry.len(), 2);

    let notified = registry.dispatch(&ExposingCategory::Content, discovery_data());
    assert_eq!(notified, 2);
    assert_eq!(native.count_for(&native_id), 1);
    assert_eq!(rx.recv().await.unwrap().callback_id, host_id);

    bridge
        .unregister_segmentation_data_callback(&native_id)
        .await
        .unwrap();
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn concurrent_host_registrations_get_unique_ids() {
    let registry = Arc::new(SegmentationCallbackRegistry::new());
    let (bridge, _rx) = SegmentationBridge::new(registry.clone(), &BridgeConfig::default());
    let bridge = Arc::new(bridge);

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let bridge = bridge.clone();
            tokio::spawn(async move {
                bridge
                    .register_segmentation_data_callback("discovery", i % 2 == 0)
                    .await
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for task in tasks {
        ids.insert(task.await.unwrap().unwrap());
    }
    assert_eq!(ids.len(), 32);
    assert_eq!(registry.len(), 32);
}

#[tokio::test]
async fn unregister_twice_fails_the_second_time() {
    let registry = Arc::new(SegmentationCallbackRegistry::new());
    let (bridge, _rx) = SegmentationBridge::new(registry, &BridgeConfig::default());

    let id = bridge
        .register_segmentation_data_callback("merchandising", false)
        .await
        .unwrap();
    bridge.unregister_segmentation_data_callback(&id).await.unwrap();

    let err = bridge
        .unregister_segmentation_data_callback(&id)
        .await
        .unwrap_err();
    assert_eq!(err.code, "NOT_FOUND");
    assert_eq!(err.details.unwrap()["callback_instance_id"], id.as_str());
}
