pub mod rekognition_client;
pub mod rekognition_mapping;
