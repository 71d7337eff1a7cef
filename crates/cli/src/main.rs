mod settings;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use face_collections_core::collection::collection_manager::CollectionManager;
use face_collections_core::collection::domain::face_collection_service::FaceCollectionService;
use face_collections_core::collection::domain::face_record::{FaceMatch, FaceRecord};
use face_collections_core::collection::face_registry::FaceRegistry;
use face_collections_core::collection::infrastructure::rekognition_client::RekognitionClient;
use face_collections_core::imaging::infrastructure::reference_image_loader::ReferenceImageLoader;
use face_collections_core::pipeline::enroll_directory_use_case::EnrollDirectoryUseCase;
use face_collections_core::pipeline::reset_collection_use_case::ResetCollectionUseCase;
use face_collections_core::pipeline::search_face_use_case::SearchFaceUseCase;

use settings::Settings;

/// Manage face collections on a remote face-recognition service.
#[derive(Parser)]
#[command(name = "face-collections")]
struct Cli {
    /// Settings file (JSON). Defaults to the per-user settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Service endpoint URL, overriding the region-derived default.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Service region.
    #[arg(long, global = true)]
    region: Option<String>,

    /// Collection to operate on.
    #[arg(long, short, global = true)]
    collection: Option<String>,

    /// Give up on listings that are still paginating after this many pages.
    #[arg(long, global = true)]
    max_pages: Option<usize>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create, delete, check or list collections.
    #[command(subcommand)]
    Collections(CollectionsCommand),

    /// Enroll, list, look up or delete faces.
    #[command(subcommand)]
    Faces(FacesCommand),

    /// Search the collection for faces matching an image (file or URL).
    Search {
        image: String,

        /// Save a copy of the query image with the searched face outlined.
        #[arg(long)]
        annotate: Option<PathBuf>,

        /// Minimum similarity (0-100) for a match.
        #[arg(long)]
        threshold: Option<f64>,

        /// Maximum number of matches to return.
        #[arg(long)]
        max_faces: Option<u32>,
    },

    /// Ensure the collection exists and enroll every image in a directory.
    EnrollDir {
        dir: PathBuf,

        /// Skip enrollment if the collection already holds this many faces.
        #[arg(long)]
        min_faces: Option<usize>,
    },

    /// Delete every face in the collection.
    Reset {
        /// Drop and recreate the collection instead of deleting faces.
        #[arg(long)]
        recreate: bool,
    },

    /// Walk through the whole flow: check, create, enroll, list and search.
    Demo {
        /// Directory of face images to enroll.
        dir: PathBuf,

        /// Image (file or URL) to search for.
        query: String,

        #[arg(long, default_value = "3")]
        min_faces: usize,
    },
}

#[derive(Subcommand)]
enum CollectionsCommand {
    List,
    Exists { name: Option<String> },
    Create { name: Option<String> },
    Delete { name: Option<String> },
}

#[derive(Subcommand)]
enum FacesCommand {
    List,
    /// Enroll one or more images (files or URLs).
    Enroll {
        #[arg(required = true)]
        images: Vec<String>,
    },
    /// Look up the face id enrolled from an image file name.
    FindId { tag: String },
    Delete {
        #[arg(required = true)]
        face_ids: Vec<String>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    validate(&cli, &settings)?;

    let service: Arc<dyn FaceCollectionService> =
        Arc::new(RekognitionClient::new(&settings.rekognition_config())?);
    let loader = match settings.timeout() {
        Some(timeout) => ReferenceImageLoader::with_timeout(timeout)?,
        None => ReferenceImageLoader::new(),
    };
    let manager = CollectionManager::new(service.clone()).with_max_pages(settings.max_pages);
    let registry = FaceRegistry::new(service, Box::new(loader))
        .with_max_pages(settings.max_pages)
        .with_search_options(settings.search_options());
    let collection = settings.collection.as_str();
    log::debug!("Using collection {collection}");

    match cli.command {
        Command::Collections(cmd) => run_collections(&manager, cmd, collection, cli.json),
        Command::Faces(cmd) => run_faces(&registry, cmd, collection, cli.json),
        Command::Search {
            image, annotate, ..
        } => run_search(&registry, collection, &image, annotate.as_deref(), cli.json),
        Command::EnrollDir { dir, min_faces } => {
            run_enroll_dir(&manager, &registry, collection, &dir, min_faces)
        }
        Command::Reset { recreate } => run_reset(&manager, &registry, collection, recreate),
        Command::Demo {
            dir,
            query,
            min_faces,
        } => run_demo(&manager, &registry, collection, &dir, &query, min_faces),
    }
}

/// Settings file values, overridden by whatever flags were given.
fn resolve_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(endpoint) = &cli.endpoint {
        settings.endpoint = Some(endpoint.clone());
    }
    if let Some(region) = &cli.region {
        settings.region = region.clone();
    }
    if let Some(collection) = &cli.collection {
        settings.collection = collection.clone();
    }
    if cli.max_pages.is_some() {
        settings.max_pages = cli.max_pages;
    }
    if let Command::Search {
        threshold,
        max_faces,
        ..
    } = &cli.command
    {
        if threshold.is_some() {
            settings.face_match_threshold = *threshold;
        }
        if max_faces.is_some() {
            settings.max_faces = *max_faces;
        }
    }
    Ok(settings)
}

fn validate(cli: &Cli, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    if settings.collection.is_empty() {
        return Err("Collection name must not be empty".into());
    }
    if settings.max_pages == Some(0) {
        return Err("Max pages must be at least 1".into());
    }
    if let Some(threshold) = settings.face_match_threshold {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(format!("Threshold must be between 0 and 100, got {threshold}").into());
        }
    }
    if let Some(endpoint) = &settings.endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(format!("Endpoint must be an http(s) URL, got '{endpoint}'").into());
        }
    }
    if let Command::EnrollDir { dir, .. } | Command::Demo { dir, .. } = &cli.command {
        if !dir.is_dir() {
            return Err(format!("Image directory not found: {}", dir.display()).into());
        }
    }
    Ok(())
}

fn run_collections(
    manager: &CollectionManager,
    cmd: CollectionsCommand,
    collection: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        CollectionsCommand::List => {
            let names = manager.list_all()?;
            if json {
                print_json(&names)?;
            } else {
                names.iter().for_each(|n| println!("{n}"));
            }
        }
        CollectionsCommand::Exists { name } => {
            let name = name.as_deref().unwrap_or(collection);
            let exists = manager.exists(name)?;
            println!("Does {name} collection exist? {}", yes_no(exists));
        }
        CollectionsCommand::Create { name } => {
            let name = name.as_deref().unwrap_or(collection);
            manager.create(name)?;
            println!("Collection {name} is ready.");
        }
        CollectionsCommand::Delete { name } => {
            let name = name.as_deref().unwrap_or(collection);
            manager.delete(name)?;
            println!("Deleted collection {name}.");
        }
    }
    Ok(())
}

fn run_faces(
    registry: &FaceRegistry,
    cmd: FacesCommand,
    collection: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        FacesCommand::List => {
            let faces = registry.list_faces(collection)?;
            if json {
                print_json(&faces)?;
            } else {
                print_faces(&faces);
            }
        }
        FacesCommand::Enroll { images } => {
            for image in &images {
                let created = registry.enroll(collection, image)?;
                for indexed in &created {
                    println!("Enrolled {image} as {}", indexed.face.face_id);
                }
            }
        }
        FacesCommand::FindId { tag } => {
            let face_id = registry
                .find_face_id(collection, &tag)?
                .ok_or_else(|| format!("No face tagged {tag} in {collection}"))?;
            println!("{face_id}");
        }
        FacesCommand::Delete { face_ids } => {
            let deleted = registry.delete_faces(collection, &face_ids)?;
            if json {
                print_json(&deleted)?;
            } else {
                println!("Deleted {} of {} faces:", deleted.len(), face_ids.len());
                deleted.iter().for_each(|id| println!("  {id}"));
            }
        }
    }
    Ok(())
}

fn run_search(
    registry: &FaceRegistry,
    collection: &str,
    image: &str,
    annotate: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = SearchFaceUseCase::new(registry).execute(collection, image, annotate)?;
    if json {
        print_json(&result)?;
    } else {
        print_matches(&result.matches);
    }
    if let Some(path) = annotate {
        if result.searched_face_bounding_box.is_some() {
            log::info!("Annotated query written to {}", path.display());
        }
    }
    Ok(())
}

fn run_enroll_dir(
    manager: &CollectionManager,
    registry: &FaceRegistry,
    collection: &str,
    dir: &Path,
    min_faces: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress: Box<dyn Fn(usize, usize) -> bool + Send> = Box::new(|current, total| {
        eprint!("\rEnrolling image {current}/{total}");
        true
    });
    let report = EnrollDirectoryUseCase::new(manager, registry, min_faces, Some(progress))
        .execute(collection, dir)?;
    eprintln!();

    println!(
        "{} enrolled, {} without a face, {} already in {collection}",
        report.enrolled.len(),
        report.skipped.len(),
        report.existing_faces
    );
    report.skipped.iter().for_each(|s| println!("  no face: {s}"));
    Ok(())
}

fn run_reset(
    manager: &CollectionManager,
    registry: &FaceRegistry,
    collection: &str,
    recreate: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let use_case = ResetCollectionUseCase::new(manager, registry);
    if recreate {
        use_case.recreate(collection)?;
        println!("Recreated collection {collection}.");
    } else {
        let deleted = use_case.clear_faces(collection)?;
        println!("Deleted {} faces from {collection}.", deleted.len());
    }
    Ok(())
}

fn run_demo(
    manager: &CollectionManager,
    registry: &FaceRegistry,
    collection: &str,
    dir: &Path,
    query: &str,
    min_faces: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Does {collection} collection exist? {}",
        yes_no(manager.exists(collection)?)
    );

    println!("Creating collection {collection}.");
    manager.create(collection)?;

    println!("Faces currently in the collection:");
    print_faces(&registry.list_faces(collection)?);

    let report = EnrollDirectoryUseCase::new(manager, registry, Some(min_faces), None)
        .execute(collection, dir)?;
    if !report.enrolled.is_empty() {
        println!("Faces added to {collection}:");
        print_faces(&registry.list_faces(collection)?);
    }

    println!("Searching {collection} for {query}:");
    let matches = registry.search(collection, query)?;
    print_matches(&matches);
    Ok(())
}

fn print_faces(faces: &[FaceRecord]) {
    if faces.is_empty() {
        println!("  (none)");
    }
    for face in faces {
        let b = face.bounding_box;
        println!(
            "  {}  {}  left={:.3} top={:.3} width={:.3} height={:.3}",
            face.face_id,
            face.external_image_id.as_deref().unwrap_or("-"),
            b.left,
            b.top,
            b.width,
            b.height
        );
    }
}

fn print_matches(matches: &[FaceMatch]) {
    if matches.is_empty() {
        println!("  no matches");
    }
    for m in matches {
        println!(
            "  {:6.2}%  {}  {}",
            m.similarity,
            m.face.face_id,
            m.face.external_image_id.as_deref().unwrap_or("-")
        );
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_collections_core::collection::domain::face_collection_service::{
        SearchOptions, ServiceError,
    };
    use face_collections_core::collection::domain::face_record::{
        IndexedFace, Page, SearchResult,
    };
    use face_collections_core::imaging::domain::image_loader::{ImageLoadError, ImageLoader};

    /// A collection holding the given faces on a single page.
    struct FixedFaces(Vec<FaceRecord>);

    impl FaceCollectionService for FixedFaces {
        fn create_collection(&self, _name: &str) -> Result<u16, ServiceError> {
            Ok(200)
        }

        fn delete_collection(&self, _name: &str) -> Result<(), ServiceError> {
            Ok(())
        }

        fn list_collections(&self, _token: Option<&str>) -> Result<Page<String>, ServiceError> {
            Ok(Page::new(vec!["Faces".to_string()], None))
        }

        fn index_faces(
            &self,
            _collection: &str,
            _image: &[u8],
            _tag: &str,
        ) -> Result<Vec<IndexedFace>, ServiceError> {
            Ok(Vec::new())
        }

        fn list_faces(
            &self,
            _collection: &str,
            _token: Option<&str>,
        ) -> Result<Page<FaceRecord>, ServiceError> {
            Ok(Page::new(self.0.clone(), None))
        }

        fn delete_faces(
            &self,
            _collection: &str,
            face_ids: &[String],
        ) -> Result<Vec<String>, ServiceError> {
            Ok(face_ids.to_vec())
        }

        fn search_faces_by_image(
            &self,
            _collection: &str,
            _image: &[u8],
            _options: &SearchOptions,
        ) -> Result<SearchResult, ServiceError> {
            Ok(SearchResult::default())
        }
    }

    struct NoImages;

    impl ImageLoader for NoImages {
        fn load(&self, reference: &str) -> Result<Vec<u8>, ImageLoadError> {
            Err(ImageLoadError::NotFound {
                path: PathBuf::from(reference),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    fn registry(faces: Vec<FaceRecord>) -> FaceRegistry {
        FaceRegistry::new(Arc::new(FixedFaces(faces)), Box::new(NoImages))
    }

    #[test]
    fn test_find_id_unknown_tag_is_error() {
        let err = run_faces(
            &registry(Vec::new()),
            FacesCommand::FindId {
                tag: "nobody.jpg".into(),
            },
            "Faces",
            false,
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "No face tagged nobody.jpg in Faces");
    }

    #[test]
    fn test_find_id_known_tag_succeeds() {
        let face = FaceRecord {
            face_id: "f-1".into(),
            external_image_id: Some("me.jpg".into()),
            ..FaceRecord::default()
        };

        run_faces(
            &registry(vec![face]),
            FacesCommand::FindId {
                tag: "me.jpg".into(),
            },
            "Faces",
            false,
        )
        .unwrap();
    }
}
