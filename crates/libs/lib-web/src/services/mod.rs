//! # Services Layer
//!
//! Work that handlers delegate outside the database.
//!
//! - [`upload`] - Streaming JPEG/PNG uploads into the upload directory

pub mod upload;

pub use upload::UploadStore;
