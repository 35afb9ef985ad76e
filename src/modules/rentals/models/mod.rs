mod rental;

pub use rental::{select_rental, PriceResolution, Rental};
