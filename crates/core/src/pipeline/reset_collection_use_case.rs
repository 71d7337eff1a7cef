use crate::collection::collection_manager::CollectionManager;
use crate::collection::domain::collection_error::CollectionError;
use crate::collection::face_registry::FaceRegistry;

/// Empties a collection, or drops and recreates it.
pub struct ResetCollectionUseCase<'a> {
    manager: &'a CollectionManager,
    registry: &'a FaceRegistry,
}

impl<'a> ResetCollectionUseCase<'a> {
    pub fn new(manager: &'a CollectionManager, registry: &'a FaceRegistry) -> Self {
        Self { manager, registry }
    }

    /// Deletes every face in `collection` and returns the ids the service confirmed.
    pub fn clear_faces(&self, collection: &str) -> Result<Vec<String>, CollectionError> {
        let face_ids: Vec<String> = self
            .registry
            .faces(collection)
            .map(|f| f.map(|f| f.face_id))
            .collect::<Result<_, _>>()?;
        if face_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.registry.delete_faces(collection, &face_ids)
    }

    /// Deletes `collection` if present and creates it again, empty.
    pub fn recreate(&self, collection: &str) -> Result<(), CollectionError> {
        match self.manager.delete(collection) {
            Ok(()) | Err(CollectionError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        self.manager.create(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::domain::face_collection_service::FaceCollectionService;
    use crate::collection::stub_service::{face, StubFaceService, StubImageLoader};
    use crate::shared::constants::RESOURCE_NOT_FOUND;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn wire(stub: &Arc<StubFaceService>) -> (CollectionManager, FaceRegistry) {
        let service: Arc<dyn FaceCollectionService> = stub.clone();
        (
            CollectionManager::new(service.clone()),
            FaceRegistry::new(service, Box::new(StubImageLoader::default())),
        )
    }

    #[test]
    fn test_clear_faces_deletes_all_listed_ids() {
        let stub = Arc::new(StubFaceService::new().with_faces(vec![
            vec![face("f1", "a.jpg")],
            vec![face("f2", "b.jpg")],
        ]));
        let (manager, registry) = wire(&stub);

        let deleted = ResetCollectionUseCase::new(&manager, &registry)
            .clear_faces("Faces")
            .unwrap();

        assert_eq!(deleted, vec!["f1", "f2"]);
        assert_eq!(stub.calls_to("delete_faces"), vec!["delete_faces Faces f1,f2"]);
    }

    #[test]
    fn test_clear_faces_reports_partial_deletion() {
        let stub = Arc::new(StubFaceService {
            confirm_deletions: Some(HashSet::from(["f2".to_string()])),
            ..StubFaceService::new().with_faces(vec![vec![face("f1", "a"), face("f2", "b")]])
        });
        let (manager, registry) = wire(&stub);

        let deleted = ResetCollectionUseCase::new(&manager, &registry)
            .clear_faces("Faces")
            .unwrap();

        assert_eq!(deleted, vec!["f2"]);
    }

    #[test]
    fn test_clear_empty_collection_skips_delete_call() {
        let stub = Arc::new(StubFaceService::new());
        let (manager, registry) = wire(&stub);

        let deleted = ResetCollectionUseCase::new(&manager, &registry)
            .clear_faces("Faces")
            .unwrap();

        assert!(deleted.is_empty());
        assert!(stub.calls_to("delete_faces").is_empty());
    }

    #[test]
    fn test_recreate_tolerates_missing_collection() {
        let stub = Arc::new(StubFaceService {
            delete_collection_code: Some(RESOURCE_NOT_FOUND.to_string()),
            ..StubFaceService::new()
        });
        let (manager, registry) = wire(&stub);

        ResetCollectionUseCase::new(&manager, &registry)
            .recreate("Faces")
            .unwrap();

        assert_eq!(stub.calls_to("create_collection"), vec!["create_collection Faces"]);
    }

    #[test]
    fn test_recreate_propagates_other_delete_errors() {
        let stub = Arc::new(StubFaceService {
            delete_collection_code: Some("AccessDeniedException".to_string()),
            ..StubFaceService::new()
        });
        let (manager, registry) = wire(&stub);

        let err = ResetCollectionUseCase::new(&manager, &registry)
            .recreate("Faces")
            .unwrap_err();

        assert_eq!(err.code(), Some("AccessDeniedException"));
        assert!(stub.calls_to("create_collection").is_empty());
    }
}
