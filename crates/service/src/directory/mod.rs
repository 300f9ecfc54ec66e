//! The directory store: in-memory school list kept in step with the backend.

pub mod snapshot;
pub mod store;

pub use snapshot::StoreSnapshot;
pub use store::DirectoryStore;
