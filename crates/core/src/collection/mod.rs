pub mod collection_manager;
pub mod domain;
pub mod face_registry;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod stub_service;
