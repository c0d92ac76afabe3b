use crate::models::ErrorResponse;
use crate::routes::common::map_view_error;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use domain::OrderStatus;
use serde::Deserialize;
use services::orders::OrdersSnapshot;

#[derive(Debug, Deserialize)]
pub struct OrdersParams {
    /// Restrict the order list to one status.
    pub status: Option<String>,
}

/// Live order board
#[utoipa::path(
    get,
    path = "/orders",
    params(("status" = Option<String>, Query, description = "Order status filter")),
    responses(
        (status = 200, description = "Current orders snapshot"),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "Dashboard"
)]
pub async fn get_orders(
    State(state): State<AppState>,
    Query(params): Query<OrdersParams>,
) -> Result<Json<OrdersSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let status_filter = match params.status.as_deref() {
        Some(raw) => {
            let known = OrderStatus::ALL
                .iter()
                .find(|s| s.as_str().eq_ignore_ascii_case(raw.trim()));
            match known {
                Some(status) => Some(*status),
                None => {
                    return Err((
                        StatusCode::BAD_REQUEST,
                        Json(ErrorResponse::new(
                            format!("unknown order status '{raw}'"),
                            "invalid_query".to_string(),
                        )),
                    ))
                }
            }
        }
        None => None,
    };

    let mut snapshot = match state.orders.handle().current().snapshot() {
        Some(live) => (**live).clone(),
        None => state.orders.snapshot().await.map_err(map_view_error)?,
    };
    if let Some(status) = status_filter {
        snapshot.orders.retain(|card| card.status == status);
    }
    Ok(Json(snapshot))
}
