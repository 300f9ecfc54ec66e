//! Blob storage for school images.
//!
//! Contains the uploaded-file value type, object key generation and the
//! bucket client that returns public URLs.

pub mod bucket;
pub mod image;

pub use bucket::{BucketStorage, ImageStorage};
pub use image::{ImageFile, ObjectKeyGenerator};
