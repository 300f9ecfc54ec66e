//! Entity definitions for the school directory.
//! - `school`: the persisted record, its insert payload and draft validation.
//! - `errors`: model-level error type.

pub mod errors;
pub mod school;

pub use school::{filter_schools, School, SchoolDraft};
