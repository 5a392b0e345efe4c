pub mod fields;
pub mod submit;
pub mod upload;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::{EditorError, EditorResult, SubmitError};
use crate::models::{CurrentUser, ListingDraft, Route};
use crate::services::{ImageFile, ListingApi, ObjectStore, UploadProgress};

pub use fields::{ChangeEvent, ControlValue, FieldKind, FieldTable};

const PROGRESS_CAPACITY: usize = 256;

/// Holds a busy flag raised; lowers it when dropped, including when the
/// owning future is cancelled mid-request
struct BusyFlag<'a>(&'a mut bool);

impl<'a> BusyFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct ListingEditor {
    draft: ListingDraft,
    fields: FieldTable,
    user: CurrentUser,
    store: Arc<dyn ObjectStore>,
    api: Arc<dyn ListingApi>,
    progress: broadcast::Sender<UploadProgress>,
    uploading: bool,
    loading: bool,
    error: Option<String>,
    image_upload_error: Option<String>,
    submitted: Option<Route>,
}

impl ListingEditor {
    /// Start an empty draft for `user`
    pub fn new(user: CurrentUser, store: Arc<dyn ObjectStore>, api: Arc<dyn ListingApi>) -> Self {
        let (progress, _) = broadcast::channel(PROGRESS_CAPACITY);
        Self {
            draft: ListingDraft::default(),
            fields: FieldTable::new(),
            user,
            store,
            api,
            progress,
            uploading: false,
            loading: false,
            error: None,
            image_upload_error: None,
            submitted: None,
        }
    }

    pub fn draft(&self) -> &ListingDraft {
        &self.draft
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Submission error shown under the submit button
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Upload error shown under the image picker
    pub fn image_upload_error(&self) -> Option<&str> {
        self.image_upload_error.as_deref()
    }

    /// Route reached by a successful submission
    pub fn route(&self) -> Option<&Route> {
        self.submitted.as_ref()
    }

    pub fn can_upload(&self) -> bool {
        self.submitted.is_none() && !self.uploading
    }

    pub fn can_submit(&self) -> bool {
        self.submitted.is_none() && !self.uploading && !self.loading
    }

    /// Upload progress samples; telemetry only
    pub fn subscribe_progress(&self) -> broadcast::Receiver<UploadProgress> {
        self.progress.subscribe()
    }

    fn ensure_open(&self) -> EditorResult<()> {
        if self.submitted.is_some() {
            return Err(EditorError::Closed);
        }
        Ok(())
    }

    /// Apply one control change to the draft
    pub fn handle_change(&mut self, event: ChangeEvent) -> EditorResult<()> {
        self.ensure_open()?;
        self.fields.apply(&mut self.draft, event)?;
        Ok(())
    }

    /// Upload a batch of images and append their URLs in selection order.
    ///
    /// Returns how many URLs were appended. On any failure the image list is
    /// left exactly as it was.
    pub async fn upload_images(&mut self, files: &[ImageFile]) -> EditorResult<usize> {
        self.ensure_open()?;
        if files.is_empty() {
            return Ok(0);
        }
        if let Err(err) = upload::check_batch(self.draft.image_urls.len(), files) {
            warn!("Rejected image batch: {}", err);
            self.image_upload_error = Some(err.user_message().to_string());
            return Err(err.into());
        }

        self.image_upload_error = None;

        let result = {
            let _uploading = BusyFlag::raise(&mut self.uploading);
            upload::run_batch(self.store.as_ref(), files, &self.progress).await
        };

        match result {
            Ok(urls) => {
                let added = urls.len();
                self.draft.image_urls.extend(urls);
                info!(
                    "Added {} image(s), listing now has {}",
                    added,
                    self.draft.image_urls.len()
                );
                Ok(added)
            }
            Err(err) => {
                warn!("Image batch failed: {}", err);
                self.image_upload_error = Some(err.user_message().to_string());
                Err(err.into())
            }
        }
    }

    /// Drop the image at `index`; the stored object is not deleted
    pub fn remove_image(&mut self, index: usize) -> EditorResult<String> {
        self.ensure_open()?;
        let len = self.draft.image_urls.len();
        if index >= len {
            return Err(EditorError::NoSuchImage { index, len });
        }
        Ok(self.draft.image_urls.remove(index))
    }

    /// Validate and send the draft.
    ///
    /// On success the draft is discarded, the editor closes and the listing's
    /// detail route is returned. On failure the draft is kept for a retry.
    pub async fn submit(&mut self) -> EditorResult<Route> {
        self.ensure_open()?;
        if let Err(err) = submit::validate(&self.draft) {
            warn!("Draft not submitted: {}", err);
            self.error = Some(err.to_string());
            return Err(SubmitError::from(err).into());
        }

        self.error = None;
        info!("Submitting listing '{}' for user {}", self.draft.name, self.user.id);

        let result = {
            let _loading = BusyFlag::raise(&mut self.loading);
            self.api.create_listing(&self.draft, &self.user.id).await
        };

        match result {
            Ok(created) => {
                let route = Route::ListingDetail(created.id);
                info!("Listing created, navigating to {}", route.path());
                self.draft = ListingDraft::default();
                self.submitted = Some(route.clone());
                Ok(route)
            }
            Err(err) => {
                let err = SubmitError::from(err);
                warn!("Submission failed: {}", err);
                self.error = Some(err.user_message());
                Err(err.into())
            }
        }
    }
}
