use serde::Serialize;
use serde_json::{Map, Value};

use crate::shared::bounding_box::BoundingBox;

/// One enrolled face as held by the remote store.
///
/// Local copies are transient snapshots; the store owns the record.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FaceRecord {
    pub face_id: String,
    pub external_image_id: Option<String>,
    pub bounding_box: BoundingBox,
    pub image_id: Option<String>,
    pub confidence: Option<f64>,
    /// Any further fields the service returned, kept verbatim.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

/// A face created by an index call, with the detector's face details.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IndexedFace {
    pub face: FaceRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

/// A stored face matched by a search, with the reported similarity percentage.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FaceMatch {
    pub similarity: f64,
    pub face: FaceRecord,
}

/// Full outcome of a search-by-image call.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SearchResult {
    /// Location of the face the service searched with, within the query image.
    pub searched_face_bounding_box: Option<BoundingBox>,
    pub searched_face_confidence: Option<f64>,
    pub matches: Vec<FaceMatch>,
}

/// One page of a listing plus the cursor for the next page, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }
}
