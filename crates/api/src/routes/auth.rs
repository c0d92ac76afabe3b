use crate::middleware::AdminSession;
use crate::models::{ErrorResponse, LoginRequest, LoginResponse, LogoutResponse, SessionResponse};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Html, Extension, Json};
use services::auth::AuthError;

/// Log in with admin credentials
///
/// Returns a bearer token to send on every subsequent request.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session created", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.auth.login(&request.email, &request.password).await {
        Ok(session) => Ok(Json(LoginResponse {
            token: session.token,
            email: session.email,
            expires_at: session.expires_at,
        })),
        Err(AuthError::InvalidCredentials) => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "Invalid email or password".to_string(),
                "invalid_credentials".to_string(),
            )),
        )),
        Err(err) => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(err.to_string(), "unauthorized".to_string())),
        )),
    }
}

/// The identity behind the current session
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current admin identity", body = SessionResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "Auth"
)]
pub async fn current_session(Extension(session): Extension<AdminSession>) -> Json<SessionResponse> {
    Json(SessionResponse {
        email: session.email,
    })
}

/// Revoke the current session
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session revoked", body = LogoutResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> Json<LogoutResponse> {
    let revoked = state.auth.logout(&session.token).await;
    Json(LogoutResponse { revoked })
}

/// Minimal login page; the dashboard frontend replaces this in
/// deployments that serve static assets.
pub async fn login_page() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>Foodbnb Admin</title></head>\
         <body><h1>Foodbnb Admin</h1>\
         <p>POST /login with email and password to obtain a session token.</p>\
         </body></html>",
    )
}
