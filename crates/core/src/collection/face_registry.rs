use std::sync::Arc;

use crate::collection::domain::collection_error::CollectionError;
use crate::collection::domain::face_collection_service::{FaceCollectionService, SearchOptions};
use crate::collection::domain::face_record::{FaceMatch, FaceRecord, IndexedFace, SearchResult};
use crate::collection::domain::page_iter::PageIter;
use crate::imaging::domain::image_loader::{file_name_of, ImageLoader};

/// Enrolls, enumerates, deletes and searches faces within collections.
pub struct FaceRegistry {
    service: Arc<dyn FaceCollectionService>,
    loader: Box<dyn ImageLoader>,
    search_options: SearchOptions,
    max_pages: Option<usize>,
}

impl FaceRegistry {
    pub fn new(service: Arc<dyn FaceCollectionService>, loader: Box<dyn ImageLoader>) -> Self {
        Self {
            service,
            loader,
            search_options: SearchOptions::default(),
            max_pages: None,
        }
    }

    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.search_options = options;
        self
    }

    pub fn with_max_pages(mut self, limit: Option<usize>) -> Self {
        self.max_pages = limit;
        self
    }

    pub fn loader(&self) -> &dyn ImageLoader {
        self.loader.as_ref()
    }

    /// Indexes the face(s) in `reference`, tagged with the reference's file name.
    ///
    /// An image in which the service detects no face is an error and leaves
    /// the collection untouched.
    pub fn enroll(
        &self,
        collection: &str,
        reference: &str,
    ) -> Result<Vec<IndexedFace>, CollectionError> {
        let image = self.loader.load(reference)?;
        let tag = file_name_of(reference);
        let indexed = self.service.index_faces(collection, &image, tag)?;
        if indexed.is_empty() {
            return Err(CollectionError::NoFaceDetected {
                reference: reference.to_string(),
            });
        }
        log::info!(
            "Enrolled {} face(s) from {reference} into {collection}",
            indexed.len()
        );
        Ok(indexed)
    }

    /// Lazily enumerates the faces of `collection` in service order.
    pub fn faces<'a>(&'a self, collection: &'a str) -> PageIter<'a, FaceRecord> {
        let service = &self.service;
        PageIter::new(Box::new(move |token: Option<&str>| {
            service.list_faces(collection, token)
        }))
        .with_max_pages(self.max_pages)
    }

    pub fn list_faces(&self, collection: &str) -> Result<Vec<FaceRecord>, CollectionError> {
        self.faces(collection).collect()
    }

    /// Face id of the first face tagged `external_image_id`, in listing order.
    ///
    /// Tags are not unique; later duplicates are ignored. Pages after the
    /// first match are not fetched.
    pub fn find_face_id(
        &self,
        collection: &str,
        external_image_id: &str,
    ) -> Result<Option<String>, CollectionError> {
        for face in self.faces(collection) {
            let face = face?;
            if face.external_image_id.as_deref() == Some(external_image_id) {
                return Ok(Some(face.face_id));
            }
        }
        Ok(None)
    }

    /// Deletes `face_ids`, returning only the ids the service confirms.
    ///
    /// A partial deletion is not an error.
    pub fn delete_faces(
        &self,
        collection: &str,
        face_ids: &[String],
    ) -> Result<Vec<String>, CollectionError> {
        let deleted = self.service.delete_faces(collection, face_ids)?;
        if deleted.len() < face_ids.len() {
            log::warn!(
                "Deleted {} of {} requested faces from {collection}",
                deleted.len(),
                face_ids.len()
            );
        } else {
            log::info!("Deleted {} faces from {collection}", deleted.len());
        }
        Ok(deleted)
    }

    /// Faces in `collection` matching the face in `reference`, as ranked by the service.
    pub fn search(
        &self,
        collection: &str,
        reference: &str,
    ) -> Result<Vec<FaceMatch>, CollectionError> {
        Ok(self.search_detailed(collection, reference)?.matches)
    }

    pub fn search_detailed(
        &self,
        collection: &str,
        reference: &str,
    ) -> Result<SearchResult, CollectionError> {
        let image = self.loader.load(reference)?;
        let result = self
            .service
            .search_faces_by_image(collection, &image, &self.search_options)?;
        log::debug!(
            "Search of {collection} with {reference} returned {} matches",
            result.matches.len()
        );
        Ok(result)
    }
}
