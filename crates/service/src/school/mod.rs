//! Persistence of school listings: repository abstraction plus the
//! PostgREST-backed implementation.

pub mod repository;

pub use repository::{PostgrestSchoolRepository, SchoolRepository};
