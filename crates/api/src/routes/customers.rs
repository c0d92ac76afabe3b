use crate::models::ErrorResponse;
use crate::routes::common::map_view_error;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use services::customers::CustomersSnapshot;

#[derive(Debug, Deserialize)]
pub struct CustomersParams {
    /// Case-insensitive search over name, email, and id.
    pub q: Option<String>,
}

/// Customer roster
#[utoipa::path(
    get,
    path = "/customers",
    params(("q" = Option<String>, Query, description = "Search query")),
    responses(
        (status = 200, description = "Current customers snapshot"),
        (status = 503, description = "Store unavailable", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "Dashboard"
)]
pub async fn get_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomersParams>,
) -> Result<Json<CustomersSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    // A search always recomputes against the store; only the unfiltered
    // roster is served from the live view.
    let snapshot = match (&params.q, state.customers.handle().current().snapshot()) {
        (None, Some(live)) => (**live).clone(),
        (query, _) => state
            .customers
            .snapshot(query.as_deref())
            .await
            .map_err(map_view_error)?,
    };
    Ok(Json(snapshot))
}
