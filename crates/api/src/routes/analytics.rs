use crate::models::ErrorResponse;
use crate::routes::common::map_view_error;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use services::analytics::AnalyticsSnapshot;

/// Analytics page
///
/// Revenue trend, cancellation impact, customer segments, and
/// order-frequency shares.
#[utoipa::path(
    get,
    path = "/analytics",
    responses(
        (status = 200, description = "Current analytics snapshot"),
        (status = 503, description = "Store unavailable", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "Dashboard"
)]
pub async fn get_analytics(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let snapshot = match state.analytics.handle().current().snapshot() {
        Some(live) => (**live).clone(),
        None => state.analytics.snapshot().await.map_err(map_view_error)?,
    };
    Ok(Json(snapshot))
}
