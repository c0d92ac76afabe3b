use crate::models::ErrorResponse;
use crate::routes::common::map_view_error;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use services::restaurants::RestaurantsSnapshot;

/// Partner kitchens
#[utoipa::path(
    get,
    path = "/restaurant",
    responses(
        (status = 200, description = "Current restaurants snapshot"),
        (status = 503, description = "Store unavailable", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "Dashboard"
)]
pub async fn get_restaurants(
    State(state): State<AppState>,
) -> Result<Json<RestaurantsSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let snapshot = match state.restaurants.handle().current().snapshot() {
        Some(live) => (**live).clone(),
        None => state.restaurants.snapshot().await.map_err(map_view_error)?,
    };
    Ok(Json(snapshot))
}
