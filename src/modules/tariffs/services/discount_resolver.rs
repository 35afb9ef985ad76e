use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::core::{BusinessClock, Result};
use crate::modules::tariffs::models::Discount;
use crate::modules::tariffs::repositories::TariffRepository;

/// Resolves the combined weekday + month discount for a date
#[derive(Clone)]
pub struct DiscountResolver {
    tariffs: Arc<dyn TariffRepository>,
    clock: BusinessClock,
}

impl DiscountResolver {
    pub fn new(tariffs: Arc<dyn TariffRepository>, clock: BusinessClock) -> Self {
        Self { tariffs, clock }
    }

    /// Discount in force on `as_of`.
    ///
    /// Active tariffs are filtered by the store; matching by kind and
    /// Spanish day/month name happens in `Discount::from_tariffs`.
    pub async fn resolve_discount(&self, as_of: NaiveDate) -> Result<Discount> {
        let active = self.tariffs.list_active(as_of).await?;
        let discount = Discount::from_tariffs(&active, as_of);

        tracing::debug!(
            date = %as_of,
            weekday = discount.weekday,
            month = discount.month,
            total = %discount.total,
            "Discount resolved"
        );

        Ok(discount)
    }

    /// Discounts for several dates from a single read of the tariff table
    pub async fn resolve_discounts<I>(&self, dates: I) -> Result<HashMap<NaiveDate, Discount>>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let tariffs = self.tariffs.list().await?;

        let discounts: HashMap<NaiveDate, Discount> = dates
            .into_iter()
            .map(|date| (date, Discount::from_tariffs(&tariffs, date)))
            .collect();

        tracing::debug!(dates = discounts.len(), "Discounts resolved");
        Ok(discounts)
    }

    /// Discount in force today (business-local date)
    pub async fn resolve_today(&self) -> Result<Discount> {
        self.resolve_discount(self.clock.today()).await
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
