use thiserror::Error;

use crate::collection::domain::face_collection_service::ServiceError;
use crate::imaging::domain::image_loader::ImageLoadError;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("collection {name} not found ({code})")]
    NotFound { name: String, code: String },
    #[error("could not create collection {name}, status code: {status}")]
    Creation { name: String, status: u16 },
    #[error("no face found in image {reference}")]
    NoFaceDetected { reference: String },
    #[error("listing still had more results after {limit} pages")]
    PageLimitExceeded { limit: usize },
}

impl CollectionError {
    /// Remote error code carried by this error, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            CollectionError::Service(e) => e.code(),
            CollectionError::NotFound { code, .. } => Some(code),
            _ => None,
        }
    }
}
