pub mod enroll_directory_use_case;
pub mod reset_collection_use_case;
pub mod search_face_use_case;
