use thiserror::Error;

use crate::collection::domain::face_record::{FaceRecord, IndexedFace, Page, SearchResult};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("request to {operation} failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{operation} rejected with {code} (HTTP {status}): {message}")]
    Remote {
        operation: String,
        code: String,
        message: String,
        status: u16,
    },
    #[error("malformed {operation} response: {source}")]
    Decode {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ServiceError {
    /// The service's error code, when the service itself rejected the call.
    pub fn code(&self) -> Option<&str> {
        match self {
            ServiceError::Remote { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Optional knobs for search-by-image. `None` leaves the service default.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SearchOptions {
    pub max_faces: Option<u32>,
    pub face_match_threshold: Option<f64>,
}

/// Domain interface to the remote face collection store.
///
/// One method per remote operation. Listing methods return a single page;
/// following cursors is the caller's job.
pub trait FaceCollectionService: Send {
    /// Creates a collection and returns the status code the service reports.
    fn create_collection(&self, name: &str) -> Result<u16, ServiceError>;

    fn delete_collection(&self, name: &str) -> Result<(), ServiceError>;

    fn list_collections(&self, next_token: Option<&str>) -> Result<Page<String>, ServiceError>;

    fn index_faces(
        &self,
        collection: &str,
        image: &[u8],
        external_image_id: &str,
    ) -> Result<Vec<IndexedFace>, ServiceError>;

    fn list_faces(
        &self,
        collection: &str,
        next_token: Option<&str>,
    ) -> Result<Page<FaceRecord>, ServiceError>;

    /// Returns the ids the service confirms as deleted.
    fn delete_faces(&self, collection: &str, face_ids: &[String])
        -> Result<Vec<String>, ServiceError>;

    fn search_faces_by_image(
        &self,
        collection: &str,
        image: &[u8],
        options: &SearchOptions,
    ) -> Result<SearchResult, ServiceError>;
}
