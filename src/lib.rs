//! Rental billing engine
//!
//! Tariff discounts, rental-based line pricing and numbered invoices for a
//! rental-fleet back-office, served over HTTP with actix-web and MySQL.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use modules::invoices;
pub use modules::rentals;
pub use modules::tariffs;
pub use modules::{AppServices, Repositories};
