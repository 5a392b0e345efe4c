use std::collections::HashSet;

use chrono::Utc;
use futures::future::try_join_all;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::UploadError;
use crate::models::MAX_IMAGES;
use crate::services::{ImageFile, ObjectStore, ProgressReporter, UploadProgress};

/// Storage key for a file: submission time in epoch millis followed by the file name
pub fn storage_key(epoch_millis: i64, file_name: &str) -> String {
    format!("{}{}", epoch_millis, file_name)
}

/// Rejects the whole batch when it would push the listing past the image limit
pub fn check_capacity(current: usize, requested: usize) -> Result<(), UploadError> {
    if current + requested > MAX_IMAGES {
        return Err(UploadError::LimitExceeded {
            current,
            requested,
            max: MAX_IMAGES,
        });
    }
    Ok(())
}

/// Pre-flight checks for a whole batch: the image limit, then file names.
/// Keys in a batch share one timestamp, so names must be unique within it.
pub fn check_batch(current: usize, files: &[ImageFile]) -> Result<(), UploadError> {
    check_capacity(current, files.len())?;

    let mut seen = HashSet::with_capacity(files.len());
    for file in files {
        if !seen.insert(file.name.as_str()) {
            return Err(UploadError::DuplicateName(file.name.clone()));
        }
    }
    Ok(())
}

/// One file of a batch on its way to the object store
#[derive(Debug)]
struct UploadTask<'a> {
    index: usize,
    key: String,
    file: &'a ImageFile,
}

impl UploadTask<'_> {
    async fn run(
        self,
        store: &dyn ObjectStore,
        progress: broadcast::Sender<UploadProgress>,
    ) -> Result<String, UploadError> {
        debug!("Upload #{} started: {}", self.index, self.key);

        let reporter = ProgressReporter::new(self.key.as_str(), self.file.len() as u64, progress);
        let url = store
            .put(&self.key, self.file, reporter)
            .await
            .map_err(|source| UploadError::Failed {
                file: self.file.name.clone(),
                source,
            })?;

        debug!("Upload #{} finished: {}", self.index, url);
        Ok(url)
    }
}

/// Upload every file concurrently and collect their URLs in selection order.
///
/// The first failure fails the batch and the remaining uploads are dropped.
/// Objects already stored by the batch are left in place.
pub async fn run_batch(
    store: &dyn ObjectStore,
    files: &[ImageFile],
    progress: &broadcast::Sender<UploadProgress>,
) -> Result<Vec<String>, UploadError> {
    let started = Utc::now().timestamp_millis();
    info!(
        "Uploading batch of {} image(s) to {}",
        files.len(),
        store.store_name()
    );

    let uploads = files.iter().enumerate().map(|(index, file)| {
        UploadTask {
            index,
            key: storage_key(started, &file.name),
            file,
        }
        .run(store, progress.clone())
    });

    // try_join_all yields results in input order, not completion order
    try_join_all(uploads).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_prefixes_timestamp() {
        assert_eq!(storage_key(1_700_000_000_123, "dorm.jpg"), "1700000000123dorm.jpg");
    }

    #[test]
    fn test_capacity_is_checked_for_whole_batch() {
        assert!(check_capacity(0, 6).is_ok());
        assert!(check_capacity(4, 2).is_ok());
        assert!(matches!(
            check_capacity(4, 3),
            Err(UploadError::LimitExceeded {
                current: 4,
                requested: 3,
                max: 6
            })
        ));
    }

    #[test]
    fn test_duplicate_names_rejected_before_upload() {
        let files = vec![
            ImageFile::new("dorm.jpg", "image/jpeg", vec![1]),
            ImageFile::new("bath.jpg", "image/jpeg", vec![2]),
            ImageFile::new("dorm.jpg", "image/jpeg", vec![3]),
        ];
        assert!(matches!(
            check_batch(0, &files),
            Err(UploadError::DuplicateName(name)) if name == "dorm.jpg"
        ));
        assert!(check_batch(0, &files[..2]).is_ok());
        assert!(matches!(
            check_batch(5, &files[..2]),
            Err(UploadError::LimitExceeded { .. })
        ));
    }
}
