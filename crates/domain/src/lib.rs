//! Normalized domain records.
//!
//! Raw documents arrive with whatever shape the producing apps wrote
//! (provider timestamp wrappers, ratings stored as text, coordinates as
//! objects or delimited strings). The `from_raw` constructors here are
//! total: unknown or malformed fields resolve to documented defaults and
//! a single bad document can never blank a view.

pub mod coerce;
mod customer;
mod order;
mod restaurant;
mod review;
mod rider;

pub use coerce::GeoPoint;
pub use customer::Customer;
pub use order::{LineItem, Order, OrderStatus};
pub use restaurant::{Restaurant, RestaurantStatus};
pub use review::Review;
pub use rider::Rider;

/// Collection names pinned at this boundary.
pub mod collections {
    pub const ORDERS: &str = "orders";
    pub const USERS: &str = "users";
    pub const DRIVERS: &str = "drivers";
    pub const RESTAURANTS: &str = "moms_kitchens";
    pub const REVIEWS: &str = "reviews";
    pub const SETTINGS: &str = "delivery_settings";
}
