use crate::models::ErrorResponse;
use crate::routes::common::map_view_error;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use services::delivery::DeliverySnapshot;

/// Delivery fleet
#[utoipa::path(
    get,
    path = "/delivery",
    responses(
        (status = 200, description = "Current delivery snapshot"),
        (status = 503, description = "Store unavailable", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "Dashboard"
)]
pub async fn get_delivery(
    State(state): State<AppState>,
) -> Result<Json<DeliverySnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let snapshot = match state.delivery.handle().current().snapshot() {
        Some(live) => (**live).clone(),
        None => state.delivery.snapshot().await.map_err(map_view_error)?,
    };
    Ok(Json(snapshot))
}
