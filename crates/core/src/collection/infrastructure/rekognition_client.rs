use std::time::Duration;

use aws_config::timeout::TimeoutConfig;
use aws_config::Region;
use aws_sdk_rekognition::config::http::HttpResponse;
use aws_sdk_rekognition::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::Image;
use aws_sdk_rekognition::Client;
use tokio::runtime::{Builder, Runtime};

use crate::collection::domain::face_collection_service::{
    FaceCollectionService, SearchOptions, ServiceError,
};
use crate::collection::domain::face_record::{FaceRecord, IndexedFace, Page, SearchResult};
use crate::shared::constants::DEFAULT_REGION;

/// Where and how to reach the recognition service.
///
/// Credentials come from the ambient AWS configuration (environment,
/// profile files, instance metadata). `endpoint` overrides the regional
/// endpoint, e.g. for a local emulator.
#[derive(Clone, Debug, PartialEq)]
pub struct RekognitionConfig {
    pub region: String,
    pub endpoint: Option<String>,
    pub timeout: Option<Duration>,
}

impl RekognitionConfig {
    pub fn for_region(region: &str) -> Self {
        Self {
            region: region.to_string(),
            endpoint: None,
            timeout: None,
        }
    }
}

impl Default for RekognitionConfig {
    fn default() -> Self {
        Self::for_region(DEFAULT_REGION)
    }
}

/// Blocking front for the recognition SDK client.
///
/// Each call runs to completion on a private current-thread runtime.
pub struct RekognitionClient {
    runtime: Runtime,
    client: Client,
}

fn runtime() -> std::io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

impl RekognitionClient {
    /// Loads the ambient SDK configuration and applies `config` on top of it.
    pub fn new(config: &RekognitionConfig) -> std::io::Result<Self> {
        let runtime = runtime()?;

        let mut loader = aws_config::from_env().region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint.as_str());
        }
        if let Some(timeout) = config.timeout {
            loader = loader.timeout_config(
                TimeoutConfig::builder().operation_timeout(timeout).build(),
            );
        }
        let sdk_config = runtime.block_on(loader.load());
        log::debug!(
            "Recognition client for region {} ({})",
            config.region,
            config.endpoint.as_deref().unwrap_or("default endpoint")
        );

        Ok(Self {
            runtime,
            client: Client::new(&sdk_config),
        })
    }

    /// Wraps an already configured SDK client.
    pub fn with_client(client: Client) -> std::io::Result<Self> {
        Ok(Self {
            runtime: runtime()?,
            client,
        })
    }
}

/// Maps an SDK failure to a [`ServiceError`], keeping the service's error code.
///
/// The SDK reports an unparseable success body as a service error too; the
/// HTTP status tells the two apart.
fn service_error<E>(operation: &str, err: SdkError<E, HttpResponse>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match err {
        SdkError::ServiceError(context) if !context.raw().status().is_success() => {
            let status = context.raw().status().as_u16();
            let err = context.into_err();
            ServiceError::Remote {
                operation: operation.to_string(),
                code: err
                    .code()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP{status}")),
                message: err.message().unwrap_or_default().to_string(),
                status,
            }
        }
        err @ (SdkError::ServiceError(_) | SdkError::ResponseError(_)) => ServiceError::Decode {
            operation: operation.to_string(),
            source: Box::new(err),
        },
        err => ServiceError::Transport {
            operation: operation.to_string(),
            source: Box::new(err),
        },
    }
}

fn image(bytes: &[u8]) -> Image {
    Image::builder().bytes(Blob::new(bytes)).build()
}

impl FaceCollectionService for RekognitionClient {
    fn create_collection(&self, name: &str) -> Result<u16, ServiceError> {
        log::debug!("CreateCollection {name}");
        let output = self
            .runtime
            .block_on(self.client.create_collection().collection_id(name).send())
            .map_err(|e| service_error("CreateCollection", e))?;
        Ok(output
            .status_code
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or_default())
    }

    fn delete_collection(&self, name: &str) -> Result<(), ServiceError> {
        log::debug!("DeleteCollection {name}");
        self.runtime
            .block_on(self.client.delete_collection().collection_id(name).send())
            .map_err(|e| service_error("DeleteCollection", e))?;
        Ok(())
    }

    fn list_collections(&self, next_token: Option<&str>) -> Result<Page<String>, ServiceError> {
        log::debug!("ListCollections from {next_token:?}");
        let output = self
            .runtime
            .block_on(
                self.client
                    .list_collections()
                    .set_next_token(next_token.map(str::to_string))
                    .send(),
            )
            .map_err(|e| service_error("ListCollections", e))?;
        Ok(Page::new(
            output.collection_ids.unwrap_or_default(),
            output.next_token,
        ))
    }

    fn index_faces(
        &self,
        collection: &str,
        image_bytes: &[u8],
        external_image_id: &str,
    ) -> Result<Vec<IndexedFace>, ServiceError> {
        log::debug!("IndexFaces {collection} {external_image_id}");
        let output = self
            .runtime
            .block_on(
                self.client
                    .index_faces()
                    .collection_id(collection)
                    .image(image(image_bytes))
                    .external_image_id(external_image_id)
                    .send(),
            )
            .map_err(|e| service_error("IndexFaces", e))?;
        Ok(output
            .face_records
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect())
    }

    fn list_faces(
        &self,
        collection: &str,
        next_token: Option<&str>,
    ) -> Result<Page<FaceRecord>, ServiceError> {
        log::debug!("ListFaces {collection} from {next_token:?}");
        let output = self
            .runtime
            .block_on(
                self.client
                    .list_faces()
                    .collection_id(collection)
                    .set_next_token(next_token.map(str::to_string))
                    .send(),
            )
            .map_err(|e| service_error("ListFaces", e))?;
        Ok(Page::new(
            output
                .faces
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            output.next_token,
        ))
    }

    fn delete_faces(
        &self,
        collection: &str,
        face_ids: &[String],
    ) -> Result<Vec<String>, ServiceError> {
        log::debug!("DeleteFaces {collection} ({} ids)", face_ids.len());
        let output = self
            .runtime
            .block_on(
                self.client
                    .delete_faces()
                    .collection_id(collection)
                    .set_face_ids(Some(face_ids.to_vec()))
                    .send(),
            )
            .map_err(|e| service_error("DeleteFaces", e))?;
        Ok(output.deleted_faces.unwrap_or_default())
    }

    fn search_faces_by_image(
        &self,
        collection: &str,
        image_bytes: &[u8],
        options: &SearchOptions,
    ) -> Result<SearchResult, ServiceError> {
        log::debug!("SearchFacesByImage {collection}");
        let output = self
            .runtime
            .block_on(
                self.client
                    .search_faces_by_image()
                    .collection_id(collection)
                    .image(image(image_bytes))
                    .set_max_faces(options.max_faces.map(|n| i32::try_from(n).unwrap_or(i32::MAX)))
                    .set_face_match_threshold(options.face_match_threshold.map(|t| t as f32))
                    .send(),
            )
            .map_err(|e| service_error("SearchFacesByImage", e))?;
        Ok(output.into())
    }
}
