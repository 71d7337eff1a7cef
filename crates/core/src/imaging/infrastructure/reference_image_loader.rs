use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::imaging::domain::image_loader::{is_url, ImageLoadError, ImageLoader};

/// Loads images from local files or over HTTP(S) GET.
///
/// No caching and no retries; every call hits the file system or network.
pub struct ReferenceImageLoader {
    client: Client,
}

impl ReferenceImageLoader {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageLoadError> {
        log::debug!("Fetching image {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ImageLoadError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageLoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(|e| ImageLoadError::Transport {
            url: url.to_string(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, ImageLoadError> {
        log::debug!("Reading image {}", path.display());
        fs::read(path).map_err(|e| ImageLoadError::NotFound {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl Default for ReferenceImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader for ReferenceImageLoader {
    fn load(&self, reference: &str) -> Result<Vec<u8>, ImageLoadError> {
        if is_url(reference) {
            self.fetch(reference)
        } else {
            self.read_file(Path::new(reference))
        }
    }
}
