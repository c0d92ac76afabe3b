pub mod analytics;
pub mod auth;
pub mod common;
pub mod customers;
pub mod delivery;
pub mod health;
pub mod orders;
pub mod overview;
pub mod restaurants;
pub mod settings;
