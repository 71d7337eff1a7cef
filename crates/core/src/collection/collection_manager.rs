use std::sync::Arc;

use crate::collection::domain::collection_error::CollectionError;
use crate::collection::domain::face_collection_service::{FaceCollectionService, ServiceError};
use crate::collection::domain::page_iter::PageIter;
use crate::shared::constants::{CREATED_STATUS, RESOURCE_NOT_FOUND};

/// Create, delete, check and enumerate collections in the remote store.
pub struct CollectionManager {
    service: Arc<dyn FaceCollectionService>,
    max_pages: Option<usize>,
}

impl CollectionManager {
    pub fn new(service: Arc<dyn FaceCollectionService>) -> Self {
        Self {
            service,
            max_pages: None,
        }
    }

    /// Caps every listing at `limit` pages. See [`PageIter::with_max_pages`].
    pub fn with_max_pages(mut self, limit: Option<usize>) -> Self {
        self.max_pages = limit;
        self
    }

    /// Lazily enumerates collection names in service order.
    pub fn collections(&self) -> PageIter<'_, String> {
        let service = &self.service;
        PageIter::new(Box::new(move |token: Option<&str>| {
            service.list_collections(token)
        }))
        .with_max_pages(self.max_pages)
    }

    pub fn list_all(&self) -> Result<Vec<String>, CollectionError> {
        self.collections().collect()
    }

    pub fn exists(&self, name: &str) -> Result<bool, CollectionError> {
        Ok(self.list_all()?.iter().any(|c| c == name))
    }

    /// Creates `name` unless it already exists.
    pub fn create(&self, name: &str) -> Result<(), CollectionError> {
        if self.exists(name)? {
            log::debug!("Collection {name} already exists");
            return Ok(());
        }

        let status = self.service.create_collection(name)?;
        if status != CREATED_STATUS {
            return Err(CollectionError::Creation {
                name: name.to_string(),
                status,
            });
        }
        log::info!("Created collection {name}");
        Ok(())
    }

    /// Deletes `name`; a missing collection is reported as [`CollectionError::NotFound`].
    pub fn delete(&self, name: &str) -> Result<(), CollectionError> {
        match self.service.delete_collection(name) {
            Ok(()) => {
                log::info!("Deleted collection {name}");
                Ok(())
            }
            Err(ServiceError::Remote { code, .. }) if code == RESOURCE_NOT_FOUND => {
                Err(CollectionError::NotFound {
                    name: name.to_string(),
                    code,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
