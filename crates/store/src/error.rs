/// Shared error taxonomy for document store operations.
///
/// `InvalidQuery` is a development-time defect (a filter the backend
/// cannot express); the other variants are runtime conditions the view
/// layer surfaces to the operator.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Store unreachable: {0}")]
    DataUnavailable(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Query not expressible by the store: {0}")]
    InvalidQuery(String),
    #[error("'{0}' does not exist")]
    NotFound(String),
}
