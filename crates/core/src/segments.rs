//! Segmentation data model — the categories a host can observe and the
//! segment memberships delivered for them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SdkError;

/// Named segmentation stream a callback listens to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExposingCategory {
    Discovery,
    Content,
    Merchandising,
    Other(String),
}

impl ExposingCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ExposingCategory::Discovery => "discovery",
            ExposingCategory::Content => "content",
            ExposingCategory::Merchandising => "merchandising",
            ExposingCategory::Other(name) => name,
        }
    }
}

impl FromStr for ExposingCategory {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "" => Err(SdkError::InvalidCategory(s.to_string())),
            "discovery" => Ok(ExposingCategory::Discovery),
            "content" => Ok(ExposingCategory::Content),
            "merchandising" => Ok(ExposingCategory::Merchandising),
            _ => Ok(ExposingCategory::Other(name)),
        }
    }
}

impl TryFrom<String> for ExposingCategory {
    type Error = SdkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExposingCategory> for String {
    fn from(category: ExposingCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for ExposingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single segment the customer currently belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub segmentation_id: String,
}

impl Segment {
    pub fn new(id: impl Into<String>, segmentation_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            segmentation_id: segmentation_id.into(),
        }
    }
}

/// Segment memberships for one category, as delivered to callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentationData {
    pub segments: Vec<Segment>,
}

impl SegmentationData {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromIterator<Segment> for SegmentationData {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}
