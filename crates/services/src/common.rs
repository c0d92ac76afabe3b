use store::StoreError;

/// View-level errors surfaced to the presentation layer in place of
/// content. Normalization and aggregation are total and never appear
/// here; these all originate at the store boundary.
#[derive(thiserror::Error, Debug)]
pub enum ViewError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl From<StoreError> for ViewError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DataUnavailable(msg) => ViewError::DataUnavailable(msg),
            StoreError::PermissionDenied(msg) => ViewError::PermissionDenied(msg),
            StoreError::InvalidQuery(msg) => ViewError::InvalidQuery(msg),
            StoreError::NotFound(msg) => ViewError::DataUnavailable(msg),
        }
    }
}
