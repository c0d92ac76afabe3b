use crate::models::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};
use services::settings::{SettingsCategory, SettingsError};

fn parse_category(raw: &str) -> Result<SettingsCategory, (StatusCode, Json<ErrorResponse>)> {
    SettingsCategory::parse(raw).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                format!("unknown settings category '{raw}'"),
                "unknown_category".to_string(),
            )),
        )
    })
}

fn map_settings_error(error: SettingsError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        SettingsError::UnknownCategory(_) => StatusCode::NOT_FOUND,
        SettingsError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (
        status,
        Json(ErrorResponse::new(
            error.to_string(),
            "settings_error".to_string(),
        )),
    )
}

/// Read one settings category
///
/// A never-saved category returns its built-in defaults.
#[utoipa::path(
    get,
    path = "/settings/{category}",
    params(("category" = String, Path, description = "notifications, delivery, or menu")),
    responses(
        (status = 200, description = "Stored or default settings"),
        (status = 404, description = "Unknown category", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "Settings"
)]
pub async fn get_settings(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Map<String, Value>>, (StatusCode, Json<ErrorResponse>)> {
    let category = parse_category(&category)?;
    state
        .settings
        .get(category)
        .await
        .map(Json)
        .map_err(map_settings_error)
}

/// Save one settings category
///
/// The submitted document replaces the stored one wholesale.
#[utoipa::path(
    put,
    path = "/settings/{category}",
    params(("category" = String, Path, description = "notifications, delivery, or menu")),
    responses(
        (status = 200, description = "Settings saved"),
        (status = 404, description = "Unknown category", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "Settings"
)]
pub async fn put_settings(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<Json<Map<String, Value>>, (StatusCode, Json<ErrorResponse>)> {
    let category = parse_category(&category)?;
    state
        .settings
        .save(category, fields.clone())
        .await
        .map_err(map_settings_error)?;
    Ok(Json(fields))
}
