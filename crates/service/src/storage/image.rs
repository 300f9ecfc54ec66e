use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::errors::ServiceError;

/// An image picked for upload: original file name, guessed content type and bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(extension_of(&file_name)).to_string();
        Self { file_name, content_type, bytes }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ServiceError::Io(format!("{}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, bytes))
    }

    pub fn extension(&self) -> Option<&str> {
        extension_of(&self.file_name)
    }
}

fn extension_of(file_name: &str) -> Option<&str> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && !ext.contains(['/', '\\']))
}

fn content_type_for(ext: Option<&str>) -> &'static str {
    match ext.map(str::to_ascii_lowercase).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Issues `{prefix}/{unix_millis}.{ext}` keys.
///
/// The millisecond component is strictly increasing per generator, so two
/// uploads started in the same millisecond still get distinct keys.
#[derive(Debug, Default)]
pub struct ObjectKeyGenerator {
    last_millis: AtomicI64,
}

impl ObjectKeyGenerator {
    pub fn new() -> Self { Self::default() }

    pub fn next_key(&self, prefix: &str, file: &ImageFile) -> String {
        let millis = self.next_millis(Utc::now().timestamp_millis());
        let prefix = prefix.trim_matches('/');
        match file.extension() {
            Some(ext) => format!("{prefix}/{millis}.{ext}"),
            None => format!("{prefix}/{millis}"),
        }
    }

    fn next_millis(&self, now: i64) -> i64 {
        let prev = self
            .last_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or(now);
        now.max(prev + 1)
    }
}
