pub mod config;
pub mod editor;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use editor::{ChangeEvent, ListingEditor};
pub use error::{EditorError, EditorResult};
pub use models::{Category, CurrentUser, ListingDraft, Route};
