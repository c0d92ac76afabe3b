use crate::models::ErrorResponse;
use crate::routes::common::map_view_error;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use services::overview::{OverviewService, OverviewSnapshot};

#[derive(Debug, Deserialize)]
pub struct OverviewParams {
    /// Restrict the review list to one star rating (1-5).
    pub star: Option<u8>,
}

/// Dashboard overview
///
/// Headline totals, recent orders, and reviews, optionally filtered to
/// one star rating.
#[utoipa::path(
    get,
    path = "/charts",
    params(("star" = Option<u8>, Query, description = "Star rating filter for reviews")),
    responses(
        (status = 200, description = "Current overview snapshot"),
        (status = 400, description = "Invalid star filter", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "Dashboard"
)]
pub async fn get_overview(
    State(state): State<AppState>,
    Query(params): Query<OverviewParams>,
) -> Result<Json<OverviewSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    if let Some(star) = params.star {
        if !(1..=5).contains(&star) {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    format!("star filter must be 1-5, got {star}"),
                    "invalid_query".to_string(),
                )),
            ));
        }
    }

    let mut snapshot = match state.overview.handle().current().snapshot() {
        Some(live) => (**live).clone(),
        None => state.overview.snapshot().await.map_err(map_view_error)?,
    };
    if let Some(star) = params.star {
        snapshot.reviews = OverviewService::filter_reviews_by_star(&snapshot.reviews, star);
    }
    Ok(Json(snapshot))
}
