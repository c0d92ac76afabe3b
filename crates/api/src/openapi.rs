use crate::models::*;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Foodbnb Admin API",
        description = "Admin dashboard API for the Foodbnb food-delivery platform.\n\n\
            Log in with `POST /login` and send the returned token as \
            `Authorization: Bearer <token>` on every dashboard request.",
        version = "1.0.0",
        license(name = "MIT")
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::login,
        crate::routes::auth::current_session,
        crate::routes::auth::logout,
        crate::routes::overview::get_overview,
        crate::routes::analytics::get_analytics,
        crate::routes::orders::get_orders,
        crate::routes::customers::get_customers,
        crate::routes::delivery::get_delivery,
        crate::routes::restaurants::get_restaurants,
        crate::routes::settings::get_settings,
        crate::routes::settings::put_settings,
    ),
    components(schemas(
        ErrorResponse,
        ErrorDetail,
        LoginRequest,
        LoginResponse,
        SessionResponse,
        LogoutResponse,
        HealthResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Auth", description = "Admin sessions"),
        (name = "Dashboard", description = "Derived dashboard views"),
        (name = "Settings", description = "Settings persistence"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("opaque")
                        .build(),
                ),
            );
        }
    }
}
