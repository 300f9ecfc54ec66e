//! Data access and state synchronization for the school directory.
//! - `directory`: the store presentation layers render from.
//! - `school` / `storage`: remote table and image bucket behind traits.
//! - `backend`: wiring from configuration to concrete clients.
//! - `notify`: user-facing success/failure sink.

pub mod backend;
pub mod directory;
pub mod errors;
mod http;
pub mod notify;
pub mod school;
pub mod storage;

pub use backend::Backend;
pub use directory::{DirectoryStore, StoreSnapshot};
pub use errors::{ServiceError, NOT_CONFIGURED_MESSAGE};
pub use notify::Notifier;
