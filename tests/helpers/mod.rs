// Test helpers shared by integration and contract tests
//
// Services run against in-memory repositories and a fixed clock, so every
// test sees the same "today": Monday 1 January 2024 in the business offset
// (UTC-5).
//
// Usage:
//   #[path = "../helpers/mod.rs"]
//   mod helpers;
//   use helpers::*;

#![allow(dead_code)]

pub mod memory;

pub use memory::*;
pub use test_data::*;
pub use test_database::TestDatabase;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rental_billing::config::BillingConfig;
use rental_billing::core::FixedClock;
use rental_billing::{AppServices, Repositories};

/// Services wired to in-memory stores
pub struct TestContext {
    pub tariffs: Arc<InMemoryTariffRepository>,
    pub rentals: Arc<InMemoryRentalRepository>,
    pub invoices: Arc<InMemoryInvoiceRepository>,
    pub services: AppServices,
}

impl TestContext {
    /// Context pinned to Monday 1 January 2024, 10:00 business time
    pub fn new() -> Self {
        Self::at(monday_in_january())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self::with_billing(now, BillingConfig::default())
    }

    pub fn with_billing(now: DateTime<Utc>, billing: BillingConfig) -> Self {
        let tariffs = Arc::new(InMemoryTariffRepository::default());
        let rentals = Arc::new(InMemoryRentalRepository::default());
        let invoices = Arc::new(InMemoryInvoiceRepository::new(
            billing.first_invoice_number,
        ));

        let repos = Repositories {
            tariffs: tariffs.clone(),
            rentals: rentals.clone(),
            invoices: invoices.clone(),
        };

        let services = AppServices::new(repos, &billing, Arc::new(FixedClock(now)))
            .expect("test billing config is valid");

        Self {
            tariffs,
            rentals,
            invoices,
            services,
        }
    }

    /// Services over the same stores with the clock moved to `now`
    pub fn services_at(&self, now: DateTime<Utc>) -> AppServices {
        let repos = Repositories {
            tariffs: self.tariffs.clone(),
            rentals: self.rentals.clone(),
            invoices: self.invoices.clone(),
        };

        AppServices::new(repos, &BillingConfig::default(), Arc::new(FixedClock(now)))
            .expect("test billing config is valid")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
