use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use face_collections_core::collection::domain::face_collection_service::SearchOptions;
use face_collections_core::collection::infrastructure::rekognition_client::RekognitionConfig;
use face_collections_core::shared::constants::DEFAULT_REGION;

pub const DEFAULT_COLLECTION: &str = "Faces";

/// Persistent CLI configuration; every field can be overridden by a flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Service URL override, e.g. a local emulator. When unset, the SDK
    /// resolves the regional endpoint.
    pub endpoint: Option<String>,
    pub region: String,
    pub collection: String,
    pub max_pages: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub face_match_threshold: Option<f64>,
    pub max_faces: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: DEFAULT_REGION.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            max_pages: None,
            timeout_secs: None,
            face_match_threshold: None,
            max_faces: None,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceCollections").join("settings.json"))
    }

    /// Loads `explicit` if given (failing loudly), else the per-user settings
    /// file if it exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        match Self::config_path().filter(|p| p.exists()) {
            Some(path) => Self::read(&path).or_else(|e| {
                log::warn!("Ignoring unreadable settings file: {e}");
                Ok(Self::default())
            }),
            None => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read settings {}: {e}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .map_err(|e| format!("Invalid settings {}: {e}", path.display()))?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn rekognition_config(&self) -> RekognitionConfig {
        RekognitionConfig {
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            timeout: self.timeout(),
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_faces: self.max_faces,
            face_match_threshold: self.face_match_threshold,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
