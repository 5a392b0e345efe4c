use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A user-selected image, held in memory until its batch is uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    /// Original file name, used in the storage key
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing the content type from its extension
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Image path has no file name: {}", path.display()))?
            .to_string();
        let content_type = content_type_for(&name).to_string();

        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// One progress sample for an in-flight upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub key: String,
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl UploadProgress {
    /// Completed fraction in percent
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            100.0
        } else {
            self.bytes_transferred as f64 / self.total_bytes as f64 * 100.0
        }
    }
}

/// Publishes progress for a single storage key
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    key: String,
    total_bytes: u64,
    tx: broadcast::Sender<UploadProgress>,
}

impl ProgressReporter {
    pub fn new(key: impl Into<String>, total_bytes: u64, tx: broadcast::Sender<UploadProgress>) -> Self {
        Self {
            key: key.into(),
            total_bytes,
            tx,
        }
    }

    pub fn report(&self, bytes_transferred: u64) {
        // No subscribers is fine; progress is telemetry only
        let _ = self.tx.send(UploadProgress {
            key: self.key.clone(),
            bytes_transferred: bytes_transferred.min(self.total_bytes),
            total_bytes: self.total_bytes,
        });
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_guess() {
        assert_eq!(content_type_for("room.JPG"), "image/jpeg");
        assert_eq!(content_type_for("garden.webp"), "image/webp");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }

    #[test]
    fn test_reporter_clamps_and_publishes() {
        let (tx, mut rx) = broadcast::channel(8);
        let reporter = ProgressReporter::new("1700000000000room.jpg", 200, tx);

        reporter.report(50);
        reporter.report(500);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.percent(), 25.0);
        let second = rx.try_recv().unwrap();
        assert_eq!(second.bytes_transferred, 200);
        assert_eq!(second.key, "1700000000000room.jpg");
    }

    #[test]
    fn test_reporter_without_subscribers_does_not_fail() {
        let (tx, rx) = broadcast::channel(1);
        drop(rx);
        ProgressReporter::new("k", 10, tx).report(10);
    }
}
