pub mod collection_error;
pub mod face_collection_service;
pub mod face_record;
pub mod page_iter;
