pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;

use crate::middleware::{session_middleware, AuthState};
use crate::openapi::ApiDoc;
use crate::routes::{
    analytics::get_analytics,
    auth::{current_session, login, login_page, logout},
    customers::get_customers,
    delivery::get_delivery,
    health::health_check,
    orders::get_orders,
    overview::get_overview,
    restaurants::get_restaurants,
    settings::{get_settings, put_settings},
};
use axum::{
    middleware::from_fn_with_state,
    response::Redirect,
    routing::{get, post, put},
    Router,
};
use config::DashboardConfig;
use services::{
    AnalyticsService, AuthService, CustomersService, DeliveryService, OrdersService,
    OverviewService, RestaurantsService, SettingsService,
};
use std::sync::Arc;
use store::DocumentStore;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub overview: Arc<OverviewService>,
    pub analytics: Arc<AnalyticsService>,
    pub orders: Arc<OrdersService>,
    pub customers: Arc<CustomersService>,
    pub delivery: Arc<DeliveryService>,
    pub restaurants: Arc<RestaurantsService>,
    pub settings: Arc<SettingsService>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: &DashboardConfig) -> Self {
        Self {
            auth: Arc::new(AuthService::new(config.auth.clone())),
            overview: Arc::new(OverviewService::new(store.clone(), &config.views)),
            analytics: Arc::new(AnalyticsService::new(store.clone(), config.views.clone())),
            orders: Arc::new(OrdersService::new(store.clone())),
            customers: Arc::new(CustomersService::new(store.clone())),
            delivery: Arc::new(DeliveryService::new(store.clone())),
            restaurants: Arc::new(RestaurantsService::new(store.clone())),
            settings: Arc::new(SettingsService::new(store, &config.cache)),
        }
    }

    /// Start the live recompute loops behind every dashboard page.
    pub async fn spawn_watches(&self) -> anyhow::Result<()> {
        self.overview.spawn_watch().await?;
        self.analytics.spawn_watch().await?;
        self.orders.spawn_watch().await?;
        self.customers.spawn_watch().await?;
        self.delivery.spawn_watch().await?;
        self.restaurants.spawn_watch().await?;
        Ok(())
    }
}

pub fn build_router(state: AppState) -> Router {
    let auth_state = AuthState {
        auth: state.auth.clone(),
    };

    let protected = Router::new()
        .route("/session", get(current_session))
        .route("/logout", post(logout))
        .route("/charts", get(get_overview))
        .route("/analytics", get(get_analytics))
        .route("/orders", get(get_orders))
        .route("/customers", get(get_customers))
        .route("/delivery", get(get_delivery))
        .route("/restaurant", get(get_restaurants))
        .route("/settings/{category}", get(get_settings))
        .route("/settings/{category}", put(put_settings))
        .layer(from_fn_with_state(auth_state, session_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/login", post(login))
        .route("/login", get(login_page))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(<ApiDoc as utoipa::OpenApi>::openapi()) }),
        )
        .merge(protected)
        // Anything unrecognized lands on the login page.
        .fallback(|| async { Redirect::to("/login") })
        .layer(CorsLayer::permissive())
        .with_state(state)
}
