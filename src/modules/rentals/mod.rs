// Rentals module: read-only rental records and unit price resolution

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{PriceResolution, Rental};
pub use repositories::{MySqlRentalRepository, RentalRepository};
pub use services::RentalPriceResolver;
