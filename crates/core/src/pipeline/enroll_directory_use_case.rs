use std::fs;
use std::path::{Path, PathBuf};

use crate::collection::collection_manager::CollectionManager;
use crate::collection::domain::collection_error::CollectionError;
use crate::collection::face_registry::FaceRegistry;
use crate::shared::constants::IMAGE_EXTENSIONS;

/// Progress callback: `(current, total)`. Returning `false` stops enrollment.
pub type ProgressFn = Box<dyn Fn(usize, usize) -> bool + Send>;

#[derive(Debug, Default, PartialEq)]
pub struct EnrollmentReport {
    /// Faces already in the collection before enrolling.
    pub existing_faces: usize,
    pub enrolled: Vec<String>,
    /// Images in which no face was detected.
    pub skipped: Vec<String>,
}

/// Bulk enrollment: ensure collection → check population → enroll each image.
///
/// Images are enrolled one after another in file-name order.
pub struct EnrollDirectoryUseCase<'a> {
    manager: &'a CollectionManager,
    registry: &'a FaceRegistry,
    min_faces: Option<usize>,
    progress: Option<ProgressFn>,
}

impl<'a> EnrollDirectoryUseCase<'a> {
    pub fn new(
        manager: &'a CollectionManager,
        registry: &'a FaceRegistry,
        min_faces: Option<usize>,
        progress: Option<ProgressFn>,
    ) -> Self {
        Self {
            manager,
            registry,
            min_faces,
            progress,
        }
    }

    /// Enrolls every image in `dir` unless the collection already holds at
    /// least `min_faces` faces.
    pub fn execute(
        &self,
        collection: &str,
        dir: &Path,
    ) -> Result<EnrollmentReport, Box<dyn std::error::Error>> {
        self.manager.create(collection)?;

        let existing_faces = self.registry.list_faces(collection)?.len();
        let mut report = EnrollmentReport {
            existing_faces,
            ..EnrollmentReport::default()
        };
        if let Some(min) = self.min_faces {
            if existing_faces >= min {
                log::info!("{collection} already has {existing_faces} faces, skipping enrollment");
                return Ok(report);
            }
        }

        let images = image_files(dir)?;
        let total = images.len();
        for (i, path) in images.iter().enumerate() {
            if let Some(ref cb) = self.progress {
                if !cb(i + 1, total) {
                    log::info!("Enrollment stopped after {i} of {total} images");
                    break;
                }
            }
            let reference = path.to_string_lossy().into_owned();
            match self.registry.enroll(collection, &reference) {
                Ok(_) => report.enrolled.push(reference),
                Err(CollectionError::NoFaceDetected { .. }) => {
                    log::warn!("No face found in {reference}, skipping");
                    report.skipped.push(reference);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(report)
    }
}

/// Image files directly inside `dir`, by extension, sorted by path.
pub fn image_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_image_extension(path))
        .collect();
    files.sort();
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
