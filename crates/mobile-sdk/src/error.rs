//! Structured failures returned across the host boundary.

use segment_sdk_core::SdkError;
use serde::Serialize;
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failure outcome of a bridge call: a stable code, a human-readable
/// message and optional structured details.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{code}: {message}")]
pub struct BridgeError {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl BridgeError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.code == "NOT_FOUND"
    }
}

impl From<SdkError> for BridgeError {
    fn from(err: SdkError) -> Self {
        let bridged = BridgeError::new(err.code(), err.to_string());
        match err {
            SdkError::NotFound(id) => bridged.with_details(serde_json::json!({
                "callback_instance_id": id,
            })),
            SdkError::InvalidCategory(name) => bridged.with_details(serde_json::json!({
                "exposing_category": name,
            })),
            _ => bridged,
        }
    }
}
