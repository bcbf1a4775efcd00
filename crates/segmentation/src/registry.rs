//! Callback registry — tracks which host callbacks observe which
//! segmentation category and fans dispatched data out to them.

use chrono::{DateTime, Utc};
use parking_lot::{ReentrantMutex, RwLock};
use segment_sdk_core::{ExposingCategory, SdkError, SdkResult, SegmentationData};
use serde::Serialize;
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::sink::SegmentationDataSink;

/// Descriptive part of a registration, safe to hand out to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackInfo {
    pub id: String,
    pub exposing_category: ExposingCategory,
    pub include_first_load: bool,
    pub registered_at: DateTime<Utc>,
}

/// Data dispatched for a category, tagged with the registry-wide
/// generation it was dispatched at.
#[derive(Clone)]
struct Snapshot {
    generation: u64,
    data: SegmentationData,
}

struct CallbackRegistration {
    info: CallbackInfo,
    sink: Arc<dyn SegmentationDataSink>,
    /// Generation of the last snapshot handed to `sink`; 0 before any.
    /// Reentrant so a sink may dispatch from inside its own delivery.
    delivered: ReentrantMutex<Cell<u64>>,
}

impl CallbackRegistration {
    /// Hand `snapshot` to the sink unless it already saw the same or a newer
    /// generation. Returns whether the sink was invoked.
    fn deliver(&self, snapshot: &Snapshot) -> bool {
        let delivered = self.delivered.lock();
        if snapshot.generation <= delivered.get() {
            debug!(
                callback_id = %self.info.id,
                generation = snapshot.generation,
                last_delivered = delivered.get(),
                "Skipping stale segmentation data"
            );
            return false;
        }
        delivered.set(snapshot.generation);
        self.sink.deliver(&self.info, &snapshot.data);
        true
    }
}

#[derive(Default)]
struct RegistryState {
    callbacks: HashMap<String, Arc<CallbackRegistration>>,
    latest: HashMap<ExposingCategory, Snapshot>,
    generation: u64,
}

/// Shared registry of segmentation callbacks.
///
/// Owned explicitly (usually behind an `Arc`) and passed to whoever needs
/// it. Mutations are serialized by a write lock; sinks are always invoked
/// after the lock is released, on a snapshot of the matching registrations.
/// A callback never receives data older than what it was last given.
#[derive(Default)]
pub struct SegmentationCallbackRegistry {
    state: RwLock<RegistryState>,
}

impl SegmentationCallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new callback and return its instance id.
    ///
    /// With `include_first_load` set and data already known for the
    /// category, the sink receives that data before this call returns,
    /// unless a concurrent dispatch already gave it something newer.
    pub fn register(
        &self,
        exposing_category: ExposingCategory,
        include_first_load: bool,
        deliver: Arc<dyn SegmentationDataSink>,
    ) -> String {
        let (registration, first_load) = self.insert(exposing_category, include_first_load, deliver);

        info!(
            callback_id = %registration.info.id,
            category = %registration.info.exposing_category,
            include_first_load,
            "Segmentation callback registered"
        );

        if let Some(snapshot) = first_load {
            if registration.deliver(&snapshot) {
                debug!(
                    callback_id = %registration.info.id,
                    segments = snapshot.data.len(),
                    "Replayed first load"
                );
            }
        }

        registration.info.id.clone()
    }

    fn insert(
        &self,
        exposing_category: ExposingCategory,
        include_first_load: bool,
        sink: Arc<dyn SegmentationDataSink>,
    ) -> (Arc<CallbackRegistration>, Option<Snapshot>) {
        let mut state = self.state.write();
        let mut id = Uuid::new_v4().to_string();
        while state.callbacks.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }

        let first_load = if include_first_load {
            state.latest.get(&exposing_category).cloned()
        } else {
            None
        };
        let registration = Arc::new(CallbackRegistration {
            info: CallbackInfo {
                id: id.clone(),
                exposing_category,
                include_first_load,
                registered_at: Utc::now(),
            },
            sink,
            delivered: ReentrantMutex::new(Cell::new(0)),
        });
        state.callbacks.insert(id, registration.clone());
        (registration, first_load)
    }

    /// Remove the callback registered under `id`.
    pub fn unregister(&self, id: &str) -> SdkResult<()> {
        let removed = self.state.write().callbacks.remove(id);
        match removed {
            Some(registration) => {
                info!(
                    callback_id = %id,
                    category = %registration.info.exposing_category,
                    "Segmentation callback unregistered"
                );
                Ok(())
            }
            None => {
                debug!(callback_id = %id, "Unregister of unknown segmentation callback");
                Err(SdkError::NotFound(id.to_string()))
            }
        }
    }

    /// Deliver `data` to every callback observing `category` and remember it
    /// for later first-load replays. Returns the number of callbacks notified.
    pub fn dispatch(&self, category: &ExposingCategory, data: SegmentationData) -> usize {
        let (snapshot, targets) = {
            let mut state = self.state.write();
            state.generation += 1;
            let snapshot = Snapshot {
                generation: state.generation,
                data,
            };
            state.latest.insert(category.clone(), snapshot.clone());
            let targets: Vec<Arc<CallbackRegistration>> = state
                .callbacks
                .values()
                .filter(|r| &r.info.exposing_category == category)
                .cloned()
                .collect();
            (snapshot, targets)
        };

        debug!(
            category = %category,
            generation = snapshot.generation,
            segments = snapshot.data.len(),
            callbacks = targets.len(),
            "Dispatching segmentation data"
        );

        targets.iter().filter(|r| r.deliver(&snapshot)).count()
    }

    pub fn get(&self, id: &str) -> Option<CallbackInfo> {
        self.state.read().callbacks.get(id).map(|r| r.info.clone())
    }

    pub fn list(&self) -> Vec<CallbackInfo> {
        self.state
            .read()
            .callbacks
            .values()
            .map(|r| r.info.clone())
            .collect()
    }

    /// Last data dispatched for `category`, if any.
    pub fn latest(&self, category: &ExposingCategory) -> Option<SegmentationData> {
        self.state.read().latest.get(category).map(|s| s.data.clone())
    }

    /// Drop every registration and all known data. Returns how many
    /// callbacks were removed.
    pub fn clear(&self) -> usize {
        let mut state = self.state.write();
        let removed = state.callbacks.len();
        state.callbacks.clear();
        state.latest.clear();
        info!(removed, "Segmentation callbacks cleared");
        removed
    }

    pub fn len(&self) -> usize {
        self.state.read().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().callbacks.is_empty()
    }
}
