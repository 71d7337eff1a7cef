use std::path::Path;

use crate::collection::domain::face_record::SearchResult;
use crate::collection::face_registry::FaceRegistry;
use crate::imaging::infrastructure::box_drawer;

/// Search pipeline: load query → search collection → optionally outline the
/// searched face on a copy of the query image.
pub struct SearchFaceUseCase<'a> {
    registry: &'a FaceRegistry,
}

impl<'a> SearchFaceUseCase<'a> {
    pub fn new(registry: &'a FaceRegistry) -> Self {
        Self { registry }
    }

    pub fn execute(
        &self,
        collection: &str,
        reference: &str,
        annotate_to: Option<&Path>,
    ) -> Result<SearchResult, Box<dyn std::error::Error>> {
        let result = self.registry.search_detailed(collection, reference)?;

        if let Some(output) = annotate_to {
            match result.searched_face_bounding_box {
                Some(bbox) => {
                    box_drawer::annotate(self.registry.loader(), reference, &[bbox], output)?
                }
                None => log::warn!("No searched-face box reported for {reference}, nothing drawn"),
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::domain::face_record::FaceMatch;
    use crate::collection::stub_service::{face, StubFaceService};
    use crate::imaging::infrastructure::reference_image_loader::ReferenceImageLoader;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::constants::BOX_OUTLINE_RGB;
    use image::{Rgb, RgbImage};
    use std::sync::Arc;

    fn write_query(dir: &Path) -> String {
        let path = dir.join("query.png");
        RgbImage::from_pixel(100, 100, Rgb([10, 10, 10]))
            .save(&path)
            .unwrap();
        path.to_string_lossy().into_owned()
    }

    fn stub_with(result: SearchResult) -> Arc<StubFaceService> {
        Arc::new(StubFaceService {
            search_result: result,
            ..StubFaceService::new()
        })
    }

    fn registry(stub: &Arc<StubFaceService>) -> FaceRegistry {
        FaceRegistry::new(stub.clone(), Box::new(ReferenceImageLoader::new()))
    }

    #[test]
    fn test_returns_matches_without_annotation() {
        let dir = tempfile::tempdir().unwrap();
        let query = write_query(dir.path());
        let stub = stub_with(SearchResult {
            matches: vec![FaceMatch {
                similarity: 99.0,
                face: face("f1", "gaspar.jpg"),
            }],
            ..SearchResult::default()
        });
        let registry = registry(&stub);

        let result = SearchFaceUseCase::new(&registry)
            .execute("ProfFaces", &query, None)
            .unwrap();

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].face.external_image_id.as_deref(), Some("gaspar.jpg"));
    }

    #[test]
    fn test_annotates_searched_face() {
        let dir = tempfile::tempdir().unwrap();
        let query = write_query(dir.path());
        let output = dir.path().join("annotated.png");
        let stub = stub_with(SearchResult {
            searched_face_bounding_box: Some(BoundingBox::new(0.2, 0.2, 0.5, 0.5)),
            ..SearchResult::default()
        });
        let registry = registry(&stub);

        SearchFaceUseCase::new(&registry)
            .execute("ProfFaces", &query, Some(&output))
            .unwrap();

        let img = image::open(&output).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(20, 20).0, BOX_OUTLINE_RGB);
        assert_eq!(img.get_pixel(40, 40).0, [10, 10, 10]);
    }

    #[test]
    fn test_no_searched_box_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let query = write_query(dir.path());
        let output = dir.path().join("annotated.png");
        let stub = stub_with(SearchResult::default());
        let registry = registry(&stub);

        SearchFaceUseCase::new(&registry)
            .execute("ProfFaces", &query, Some(&output))
            .unwrap();

        assert!(!output.exists());
    }
}
