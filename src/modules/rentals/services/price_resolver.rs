use std::sync::Arc;

use chrono::NaiveDate;

use crate::core::{BusinessClock, Result};
use crate::modules::rentals::models::{select_rental, PriceResolution, Rental};
use crate::modules::rentals::repositories::RentalRepository;

/// Resolves the unit price of a product for a client from today's rental
#[derive(Clone)]
pub struct RentalPriceResolver {
    rentals: Arc<dyn RentalRepository>,
    clock: BusinessClock,
}

impl RentalPriceResolver {
    pub fn new(rentals: Arc<dyn RentalRepository>, clock: BusinessClock) -> Self {
        Self { rentals, clock }
    }

    pub async fn list_rentals(&self) -> Result<Vec<Rental>> {
        self.rentals.list().await
    }

    /// Price of the rental the client took for the product on `as_of`
    pub async fn resolve_today_price(
        &self,
        client_id: i64,
        product_id: i64,
        as_of: NaiveDate,
    ) -> Result<PriceResolution> {
        let candidates = self
            .rentals
            .find_for_day(client_id, product_id, as_of)
            .await?;

        let resolution = match select_rental(&candidates, client_id, product_id, as_of) {
            Some(rental) => PriceResolution::Found {
                rental_id: rental.id,
                price: rental.price,
            },
            None => PriceResolution::NotFound,
        };

        if !resolution.is_found() {
            tracing::debug!(client_id, product_id, date = %as_of, "No rental today");
        }

        Ok(resolution)
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
