pub mod analytics;
pub mod auth;
pub mod bucketing;
pub mod cache;
pub mod common;
pub mod customers;
pub mod delivery;
pub mod format;
pub mod orders;
pub mod overview;
pub mod restaurants;
pub mod settings;
pub mod view;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use customers::CustomersService;
pub use delivery::DeliveryService;
pub use orders::OrdersService;
pub use overview::OverviewService;
pub use restaurants::RestaurantsService;
pub use settings::SettingsService;
