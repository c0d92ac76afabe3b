use crate::models::ErrorResponse;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use services::auth::{AuthError, AuthService};
use std::sync::Arc;
use tracing::debug;

/// Validated admin identity, available to handlers as an extension.
#[derive(Clone)]
pub struct AdminSession {
    pub email: String,
    /// The raw bearer token, kept so logout can revoke it.
    pub token: String,
}

#[derive(Clone)]
pub struct AuthState {
    pub auth: Arc<AuthService>,
}

fn unauthorized(message: &str, r#type: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(message.to_string(), r#type.to_string())),
    )
}

/// Require a valid session bearer token on every request that passes
/// through.
pub async fn session_middleware(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let header = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok());

    let Some(token) = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
    else {
        debug!("missing or malformed authorization header");
        return Err(unauthorized(
            "Missing or malformed authorization header",
            "missing_auth_header",
        ));
    };

    match state.auth.validate(&token).await {
        Ok(identity) => {
            let mut request = request;
            request.extensions_mut().insert(AdminSession {
                email: identity.email,
                token: token.to_string(),
            });
            Ok(next.run(request).await)
        }
        Err(AuthError::SessionExpired) => {
            Err(unauthorized("Session expired", "session_expired"))
        }
        Err(_) => Err(unauthorized("Invalid or revoked session", "invalid_session")),
    }
}
