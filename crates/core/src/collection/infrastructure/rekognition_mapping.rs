//! Conversion from the recognition SDK's models to domain types.
//!
//! The SDK reports every field as optional `f32`/`String`; the rest of the
//! crate only ever sees the domain shapes built here.

use aws_sdk_rekognition::operation::search_faces_by_image::SearchFacesByImageOutput;
use aws_sdk_rekognition::types as sdk;
use serde_json::{Map, Value};

use crate::collection::domain::face_record::{FaceMatch, FaceRecord, IndexedFace, SearchResult};
use crate::shared::bounding_box::BoundingBox;

fn ratio(value: Option<f32>) -> f64 {
    value.map(f64::from).unwrap_or_default()
}

fn insert_number(map: &mut Map<String, Value>, key: &str, value: Option<f32>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::from(f64::from(v)));
    }
}

impl From<sdk::BoundingBox> for BoundingBox {
    fn from(b: sdk::BoundingBox) -> Self {
        BoundingBox::new(ratio(b.left), ratio(b.top), ratio(b.width), ratio(b.height))
    }
}

impl From<sdk::Face> for FaceRecord {
    fn from(f: sdk::Face) -> Self {
        let mut metadata = Map::new();
        if let Some(version) = f.index_faces_model_version {
            metadata.insert("IndexFacesModelVersion".to_string(), Value::from(version));
        }
        if let Some(user_id) = f.user_id {
            metadata.insert("UserId".to_string(), Value::from(user_id));
        }

        FaceRecord {
            face_id: f.face_id.unwrap_or_default(),
            external_image_id: f.external_image_id,
            bounding_box: f.bounding_box.map(Into::into).unwrap_or_default(),
            image_id: f.image_id,
            confidence: f.confidence.map(f64::from),
            metadata,
        }
    }
}

/// Flattens the detector's face details into a JSON map with the service's
/// field names. Only location, confidence, pose and quality are carried.
pub fn face_detail_json(detail: sdk::FaceDetail) -> Value {
    let mut map = Map::new();
    insert_number(&mut map, "Confidence", detail.confidence);
    if let Some(b) = detail.bounding_box {
        let mut bbox = Map::new();
        insert_number(&mut bbox, "Left", b.left);
        insert_number(&mut bbox, "Top", b.top);
        insert_number(&mut bbox, "Width", b.width);
        insert_number(&mut bbox, "Height", b.height);
        map.insert("BoundingBox".to_string(), Value::Object(bbox));
    }
    if let Some(pose) = detail.pose {
        let mut angles = Map::new();
        insert_number(&mut angles, "Roll", pose.roll);
        insert_number(&mut angles, "Yaw", pose.yaw);
        insert_number(&mut angles, "Pitch", pose.pitch);
        map.insert("Pose".to_string(), Value::Object(angles));
    }
    if let Some(quality) = detail.quality {
        let mut q = Map::new();
        insert_number(&mut q, "Brightness", quality.brightness);
        insert_number(&mut q, "Sharpness", quality.sharpness);
        map.insert("Quality".to_string(), Value::Object(q));
    }
    Value::Object(map)
}

impl From<sdk::FaceRecord> for IndexedFace {
    fn from(r: sdk::FaceRecord) -> Self {
        IndexedFace {
            face: r.face.map(Into::into).unwrap_or_default(),
            detail: r.face_detail.map(face_detail_json),
        }
    }
}

impl From<sdk::FaceMatch> for FaceMatch {
    fn from(m: sdk::FaceMatch) -> Self {
        FaceMatch {
            similarity: ratio(m.similarity),
            face: m.face.map(Into::into).unwrap_or_default(),
        }
    }
}

impl From<SearchFacesByImageOutput> for SearchResult {
    fn from(output: SearchFacesByImageOutput) -> Self {
        SearchResult {
            searched_face_bounding_box: output.searched_face_bounding_box.map(Into::into),
            searched_face_confidence: output.searched_face_confidence.map(f64::from),
            matches: output
                .face_matches
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}
