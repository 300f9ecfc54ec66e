use std::sync::Arc;

use arc_swap::ArcSwap;
use models::{School, SchoolDraft};
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use super::snapshot::StoreSnapshot;
use crate::backend::Backend;
use crate::errors::{ServiceError, NOT_CONFIGURED_MESSAGE};
use crate::notify::Notifier;
use crate::storage::{ImageFile, ObjectKeyGenerator};

pub const LOAD_FAILED: &str = "Failed to load schools";
pub const ADD_SUCCEEDED: &str = "School added successfully!";
pub const ADD_FAILED: &str = "Failed to add school";
pub const ADD_UNCONFIGURED: &str = "Backend is not configured. Connect a backend to add schools.";
pub const UPLOAD_FAILED: &str = "Failed to upload image";
pub const UPLOAD_UNCONFIGURED: &str = "Backend is not configured. Connect a backend to upload images.";

/// Single source of truth for the school list and the state of remote calls.
///
/// Every operation reads the current [`Backend`] once, performs at most one
/// remote call and only then publishes a new snapshot. Subscribers see
/// changes through a `watch` channel.
pub struct DirectoryStore {
    backend: ArcSwap<Backend>,
    state: watch::Sender<StoreSnapshot>,
    notifier: Arc<dyn Notifier>,
    keys: ObjectKeyGenerator,
}

impl DirectoryStore {
    /// Create a store with an empty, idle snapshot. Nothing is fetched yet.
    pub fn new(backend: Backend, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(StoreSnapshot::default());
        Self {
            backend: ArcSwap::from_pointee(backend),
            state,
            notifier,
            keys: ObjectKeyGenerator::new(),
        }
    }

    /// Create a store and run the initial refresh.
    pub async fn open(backend: Backend, notifier: Arc<dyn Notifier>) -> Self {
        let store = Self::new(backend, notifier);
        store.refresh().await;
        store
    }

    /// Swap the backend used by subsequent operations. The list is kept.
    pub fn reconfigure(&self, backend: Backend) {
        info!(configured = backend.is_configured(), "backend_reconfigured");
        self.backend.store(Arc::new(backend));
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    /// Observe every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    /// Reload the whole list, newest first. Never fails: problems land in
    /// `snapshot().error` and the previous list is left in place.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let backend = self.backend.load_full();
        let Backend::Connected { schools, .. } = backend.as_ref() else {
            warn!("refresh_skipped_unconfigured");
            self.state.send_modify(|s| {
                s.loading = false;
                s.error = Some(NOT_CONFIGURED_MESSAGE.to_string());
            });
            return;
        };

        match schools.list_newest_first().await {
            Ok(rows) => {
                info!(count = rows.len(), "schools_loaded");
                self.state.send_modify(|s| {
                    s.schools = rows;
                    s.loading = false;
                });
            }
            Err(e) => {
                error!(error = %e, "schools_load_failed");
                self.state.send_modify(|s| {
                    s.error = Some(e.to_string());
                    s.loading = false;
                });
                self.notifier.error(LOAD_FAILED);
            }
        }
    }

    /// Insert a listing and put it at the front of the list.
    ///
    /// The draft is trusted as-is. Failures are returned so callers can skip
    /// whatever depended on the insert.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: &SchoolDraft) -> Result<School, ServiceError> {
        let backend = self.backend.load_full();
        let Backend::Connected { schools, .. } = backend.as_ref() else {
            warn!("create_rejected_unconfigured");
            self.notifier.error(ADD_UNCONFIGURED);
            return Err(ServiceError::Unconfigured);
        };

        match schools.insert(draft).await {
            Ok(school) => {
                info!(id = school.id, "school_created");
                self.state.send_modify(|s| s.schools.insert(0, school.clone()));
                self.notifier.success(ADD_SUCCEEDED);
                Ok(school)
            }
            Err(e) => {
                error!(error = %e, "school_create_failed");
                self.notifier.error(ADD_FAILED);
                Err(e)
            }
        }
    }

    /// Upload an image and return its public URL, or `None` on any failure.
    /// A missing image is not fatal to a submission.
    #[instrument(skip(self, file), fields(file_name = %file.file_name, bytes = file.bytes.len()))]
    pub async fn upload_image(&self, file: &ImageFile) -> Option<String> {
        let backend = self.backend.load_full();
        let Backend::Connected { images, image_prefix, .. } = backend.as_ref() else {
            warn!("upload_skipped_unconfigured");
            self.notifier.error(UPLOAD_UNCONFIGURED);
            return None;
        };

        let key = self.keys.next_key(image_prefix, file);
        match images.upload(&key, file).await {
            Ok(()) => {
                let url = images.public_url(&key);
                info!(%key, "image_uploaded");
                Some(url)
            }
            Err(e) => {
                error!(%key, error = %e, "image_upload_failed");
                self.notifier.error(UPLOAD_FAILED);
                None
            }
        }
    }

    /// The add-school flow: upload the optional image, then insert the draft
    /// with whatever URL came back.
    pub async fn submit(&self, draft: SchoolDraft, image: Option<&ImageFile>) -> Result<School, ServiceError> {
        let image_url = match image {
            Some(file) => self.upload_image(file).await,
            None => None,
        };
        let draft = draft.with_image(image_url);
        self.create(&draft).await
    }
}
