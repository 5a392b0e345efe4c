use thiserror::Error;

/// Message shown when a batch would push the listing over the image limit
pub const UPLOAD_LIMIT_MESSAGE: &str = "You can only upload up to 6 images.";

/// Message shown when any upload in a batch fails
pub const UPLOAD_FAILED_MESSAGE: &str = "Image upload failed (max 2 MB per image)";

/// Message shown when a batch holds two files with the same name
pub const DUPLICATE_NAME_MESSAGE: &str = "Each image in a batch needs a different file name.";

/// Fallback when the API does not say what went wrong
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Errors from the field change handler.
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("Unknown control: {0}")]
    UnknownControl(String),

    #[error("Control '{id}' expects a {expected} value")]
    WrongKind { id: String, expected: &'static str },

    #[error("Control '{id}' received a non-numeric value: {value}")]
    InvalidNumber { id: String, value: String },
}

/// Local, synchronous checks that block submission.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Field '{field}' {reason}")]
    Control { field: &'static str, reason: String },

    #[error("You must upload at least one image")]
    MissingImages,

    #[error("Discount price must be less than regular price")]
    DiscountNotBelowRegular,
}

impl ValidationError {
    pub fn control(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Control {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures reported by the object store for a single file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Storage rejected '{key}' ({status}): {message}")]
    Rejected {
        key: String,
        status: u16,
        message: String,
    },

    #[error("Invalid storage response for '{key}': {message}")]
    InvalidResponse { key: String, message: String },
}

/// Failures of an upload batch.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Batch of {requested} would exceed the limit of {max} images ({current} already uploaded)")]
    LimitExceeded {
        current: usize,
        requested: usize,
        max: usize,
    },

    #[error("Batch contains more than one file named '{0}'")]
    DuplicateName(String),

    #[error("Upload of '{file}' failed: {source}")]
    Failed {
        file: String,
        #[source]
        source: StorageError,
    },
}

impl UploadError {
    /// Text shown next to the upload control
    pub fn user_message(&self) -> &'static str {
        match self {
            UploadError::LimitExceeded { .. } => UPLOAD_LIMIT_MESSAGE,
            UploadError::DuplicateName(_) => DUPLICATE_NAME_MESSAGE,
            UploadError::Failed { .. } => UPLOAD_FAILED_MESSAGE,
        }
    }
}

/// Failures talking to the listing API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Listing API returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid JSON response: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl ApiError {
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Failures of a submission attempt.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SubmitError {
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(err) => err.to_string(),
            SubmitError::Api(err) => err.user_message(),
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Top-level editor errors.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Image index {index} out of range ({len} images)")]
    NoSuchImage { index: usize, len: usize },

    #[error("The listing was already submitted")]
    Closed,
}

pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_user_facing() {
        assert_eq!(
            ValidationError::MissingImages.to_string(),
            "You must upload at least one image"
        );
        assert_eq!(
            ValidationError::DiscountNotBelowRegular.to_string(),
            "Discount price must be less than regular price"
        );
    }

    #[test]
    fn test_upload_user_messages() {
        let limit = UploadError::LimitExceeded {
            current: 5,
            requested: 2,
            max: 6,
        };
        assert_eq!(limit.user_message(), UPLOAD_LIMIT_MESSAGE);

        let failed = UploadError::Failed {
            file: "big.png".into(),
            source: StorageError::Rejected {
                key: "1700000000000big.png".into(),
                status: 403,
                message: "Permission denied".into(),
            },
        };
        assert_eq!(failed.user_message(), UPLOAD_FAILED_MESSAGE);
        assert!(failed.to_string().contains("big.png"));
    }

    #[test]
    fn test_submit_error_uses_server_message() {
        let err: SubmitError = ApiError::Rejected {
            status: 401,
            message: "Unauthorized".into(),
        }
        .into();
        assert_eq!(err.user_message(), "Unauthorized");

        let err: EditorError = SubmitError::from(ValidationError::MissingImages).into();
        assert!(err.to_string().contains("at least one image"));
    }
}
