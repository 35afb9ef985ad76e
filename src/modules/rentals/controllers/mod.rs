pub mod rental_controller;

pub use rental_controller::configure;
