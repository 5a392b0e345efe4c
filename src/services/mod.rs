pub mod api;
pub mod storage;
pub mod traits;
pub mod types;

pub use api::HttpListingApi;
pub use storage::HttpObjectStore;
pub use traits::{ListingApi, ObjectStore};
pub use types::{ImageFile, ProgressReporter, UploadProgress};
