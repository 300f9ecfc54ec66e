use std::sync::Arc;

use configs::BackendConfig;
use tracing::info;

use crate::errors::ServiceError;
use crate::school::{PostgrestSchoolRepository, SchoolRepository};
use crate::storage::{BucketStorage, ImageStorage};

/// The external services a store talks to, or their absence.
#[derive(Clone)]
pub enum Backend {
    Connected {
        schools: Arc<dyn SchoolRepository>,
        images: Arc<dyn ImageStorage>,
        image_prefix: String,
    },
    Unconfigured,
}

impl Backend {
    pub fn connected(
        schools: Arc<dyn SchoolRepository>,
        images: Arc<dyn ImageStorage>,
        image_prefix: impl Into<String>,
    ) -> Self {
        Self::Connected { schools, images, image_prefix: image_prefix.into() }
    }

    /// Build HTTP clients for a configured backend. No request timeout is set;
    /// callers wait for the service to answer.
    pub fn from_config(cfg: &BackendConfig) -> Result<Self, ServiceError> {
        match cfg {
            BackendConfig::Unconfigured => Ok(Self::Unconfigured),
            BackendConfig::Configured { endpoint, key, table, bucket, image_prefix } => {
                let client = reqwest::Client::builder()
                    .user_agent(concat!("school-directory/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .map_err(|e| ServiceError::Transport(e.to_string()))?;
                info!(%endpoint, %table, %bucket, "backend_connected");
                Ok(Self::Connected {
                    schools: Arc::new(PostgrestSchoolRepository::new(client.clone(), endpoint, key, table)),
                    images: Arc::new(BucketStorage::new(client, endpoint, key, bucket)),
                    image_prefix: image_prefix.clone(),
                })
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected { image_prefix, .. } => {
                f.debug_struct("Connected").field("image_prefix", image_prefix).finish_non_exhaustive()
            }
            Self::Unconfigured => f.write_str("Unconfigured"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_config_builds_unconfigured_backend() {
        let backend = Backend::from_config(&BackendConfig::Unconfigured).unwrap();
        assert!(!backend.is_configured());
    }

    #[test]
    fn configured_config_builds_http_backend() {
        let backend = Backend::from_config(&BackendConfig::configured("http://127.0.0.1:9", "k")).unwrap();
        match backend {
            Backend::Connected { image_prefix, .. } => assert_eq!(image_prefix, "school-images"),
            Backend::Unconfigured => panic!("expected connected backend"),
        }
    }
}
