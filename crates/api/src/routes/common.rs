use crate::models::ErrorResponse;
use axum::{http::StatusCode, Json};
use services::common::ViewError;

/// Map view errors to HTTP status codes. A store-level invalid query is
/// a misconfigured view, not a caller mistake, so it surfaces as 500.
pub fn map_view_error(error: ViewError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, r#type) = match &error {
        ViewError::DataUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "data_unavailable"),
        ViewError::PermissionDenied(_) => (StatusCode::FORBIDDEN, "permission_denied"),
        ViewError::InvalidQuery(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_server_error")
        }
    };
    (
        status,
        Json(ErrorResponse::new(error.to_string(), r#type.to_string())),
    )
}
