use crate::error::{ApiError, StorageError};
use crate::models::{CreatedListing, ListingDraft};
use crate::services::types::{ImageFile, ProgressReporter};
use async_trait::async_trait;

/// Object store that turns uploaded files into publicly fetchable URLs
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `file` under `key` and resolve its download URL.
    /// Progress goes to `progress` and is never needed for the result.
    async fn put(
        &self,
        key: &str,
        file: &ImageFile,
        progress: ProgressReporter,
    ) -> Result<String, StorageError>;

    /// Name of the storage backend, for logs
    fn store_name(&self) -> &'static str;
}

/// Remote listing API
#[async_trait]
pub trait ListingApi: Send + Sync {
    /// Create a listing owned by `user_ref` from the draft
    async fn create_listing(
        &self,
        draft: &ListingDraft,
        user_ref: &str,
    ) -> Result<CreatedListing, ApiError>;
}
