pub mod rental_repository;

pub use rental_repository::{MySqlRentalRepository, RentalRepository};
