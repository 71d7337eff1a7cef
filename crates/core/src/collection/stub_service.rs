//! In-memory stand-ins for the remote store and the image loader, shared by
//! the collection and pipeline tests.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::collection::domain::face_collection_service::{
    FaceCollectionService, SearchOptions, ServiceError,
};
use crate::collection::domain::face_record::{FaceRecord, IndexedFace, Page, SearchResult};
use crate::imaging::domain::image_loader::{ImageLoadError, ImageLoader};
use crate::shared::bounding_box::BoundingBox;

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Scripted service. Listings are served as fixed pages whose cursors are the
/// index of the next page, so repeated enumerations see the same data.
#[derive(Default)]
pub struct StubFaceService {
    pub collection_pages: Vec<Vec<String>>,
    pub face_pages: Vec<Vec<FaceRecord>>,
    pub create_status: u16,
    pub delete_collection_code: Option<String>,
    pub indexed: Vec<IndexedFace>,
    pub confirm_deletions: Option<HashSet<String>>,
    pub search_result: SearchResult,
    pub calls: CallLog,
}

impl StubFaceService {
    pub fn new() -> Self {
        Self {
            collection_pages: vec![vec![]],
            face_pages: vec![vec![]],
            create_status: 200,
            ..Self::default()
        }
    }

    pub fn with_collections(mut self, pages: &[&[&str]]) -> Self {
        self.collection_pages = pages
            .iter()
            .map(|p| p.iter().map(|s| s.to_string()).collect())
            .collect();
        self
    }

    pub fn with_faces(mut self, pages: Vec<Vec<FaceRecord>>) -> Self {
        self.face_pages = pages;
        self
    }

    pub fn calls_to(&self, operation: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(operation))
            .cloned()
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn page_at<T: Clone>(pages: &[Vec<T>], token: Option<&str>) -> Page<T> {
        let index: usize = token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let next = (index + 1 < pages.len()).then(|| (index + 1).to_string());
        Page::new(pages[index].clone(), next)
    }
}

pub fn face(face_id: &str, tag: &str) -> FaceRecord {
    FaceRecord {
        face_id: face_id.to_string(),
        external_image_id: Some(tag.to_string()),
        bounding_box: BoundingBox::new(0.1, 0.2, 0.3, 0.4),
        ..FaceRecord::default()
    }
}

fn remote(operation: &str, code: &str) -> ServiceError {
    ServiceError::Remote {
        operation: operation.to_string(),
        code: code.to_string(),
        message: format!("{operation} failed"),
        status: 400,
    }
}

impl FaceCollectionService for StubFaceService {
    fn create_collection(&self, name: &str) -> Result<u16, ServiceError> {
        self.record(format!("create_collection {name}"));
        Ok(self.create_status)
    }

    fn delete_collection(&self, name: &str) -> Result<(), ServiceError> {
        self.record(format!("delete_collection {name}"));
        match &self.delete_collection_code {
            Some(code) => Err(remote("DeleteCollection", code)),
            None => Ok(()),
        }
    }

    fn list_collections(&self, next_token: Option<&str>) -> Result<Page<String>, ServiceError> {
        self.record(format!("list_collections {next_token:?}"));
        Ok(Self::page_at(&self.collection_pages, next_token))
    }

    fn index_faces(
        &self,
        collection: &str,
        image: &[u8],
        external_image_id: &str,
    ) -> Result<Vec<IndexedFace>, ServiceError> {
        self.record(format!(
            "index_faces {collection} {external_image_id} {}",
            image.len()
        ));
        Ok(self.indexed.clone())
    }

    fn list_faces(
        &self,
        collection: &str,
        next_token: Option<&str>,
    ) -> Result<Page<FaceRecord>, ServiceError> {
        self.record(format!("list_faces {collection} {next_token:?}"));
        Ok(Self::page_at(&self.face_pages, next_token))
    }

    fn delete_faces(
        &self,
        collection: &str,
        face_ids: &[String],
    ) -> Result<Vec<String>, ServiceError> {
        self.record(format!("delete_faces {collection} {}", face_ids.join(",")));
        Ok(face_ids
            .iter()
            .filter(|id| {
                self.confirm_deletions
                    .as_ref()
                    .map_or(true, |confirmed| confirmed.contains(*id))
            })
            .cloned()
            .collect())
    }

    fn search_faces_by_image(
        &self,
        collection: &str,
        image: &[u8],
        options: &SearchOptions,
    ) -> Result<SearchResult, ServiceError> {
        self.record(format!(
            "search_faces_by_image {collection} {} {:?} {:?}",
            image.len(),
            options.max_faces,
            options.face_match_threshold
        ));
        Ok(self.search_result.clone())
    }
}

/// Serves bytes for known references; anything else is a missing file.
#[derive(Default)]
pub struct StubImageLoader {
    pub images: HashMap<String, Vec<u8>>,
    pub loads: CallLog,
}

impl StubImageLoader {
    pub fn with(references: &[&str]) -> Self {
        Self {
            images: references
                .iter()
                .map(|r| (r.to_string(), r.as_bytes().to_vec()))
                .collect(),
            loads: CallLog::default(),
        }
    }
}

impl ImageLoader for StubImageLoader {
    fn load(&self, reference: &str) -> Result<Vec<u8>, ImageLoadError> {
        self.loads.lock().unwrap().push(reference.to_string());
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| ImageLoadError::NotFound {
                path: PathBuf::from(reference),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}
