pub const DEFAULT_REGION: &str = "us-east-1";

/// Status code the service reports for a successfully created collection.
pub const CREATED_STATUS: u16 = 200;

/// Error code the service uses for a missing collection or face.
pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";

/// Outline colour for face boxes drawn on images.
pub const BOX_OUTLINE_RGB: [u8; 3] = [0, 200, 0];

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
