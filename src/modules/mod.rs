pub mod health;
pub mod invoices;
pub mod rentals;
pub mod tariffs;

use std::sync::Arc;

use actix_web::web;
use sqlx::MySqlPool;

use crate::config::BillingConfig;
use crate::core::{BusinessClock, Clock, Result};
use crate::middleware::configure_extractors;
use invoices::{InvoiceRepository, InvoiceService, LineBuilder, MySqlInvoiceRepository};
use rentals::{MySqlRentalRepository, RentalPriceResolver, RentalRepository};
use tariffs::{DiscountResolver, MySqlTariffRepository, TariffRepository, TariffService};

/// Storage backends behind the services
#[derive(Clone)]
pub struct Repositories {
    pub tariffs: Arc<dyn TariffRepository>,
    pub rentals: Arc<dyn RentalRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
}

impl Repositories {
    pub fn mysql(pool: &MySqlPool, billing: &BillingConfig) -> Self {
        Self {
            tariffs: Arc::new(MySqlTariffRepository::new(pool.clone())),
            rentals: Arc::new(MySqlRentalRepository::new(pool.clone())),
            invoices: Arc::new(MySqlInvoiceRepository::new(
                pool.clone(),
                billing.first_invoice_number,
            )),
        }
    }
}

/// Services shared by every worker
#[derive(Clone)]
pub struct AppServices {
    pub tariffs: web::Data<TariffService>,
    pub discounts: web::Data<DiscountResolver>,
    pub rentals: web::Data<RentalPriceResolver>,
    pub line_builder: web::Data<LineBuilder>,
    pub invoices: web::Data<InvoiceService>,
}

impl AppServices {
    pub fn new(repos: Repositories, billing: &BillingConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        billing.validate()?;

        let clock = BusinessClock::new(billing.calendar()?, clock);

        let discounts = DiscountResolver::new(repos.tariffs.clone(), clock.clone());
        let rentals = RentalPriceResolver::new(repos.rentals, clock.clone());
        let line_builder = LineBuilder::new(rentals.clone(), billing.iva_rate);
        let invoices = InvoiceService::new(
            repos.invoices,
            discounts.clone(),
            clock,
            billing.iva_rate,
        );

        Ok(Self {
            tariffs: web::Data::new(TariffService::new(repos.tariffs)),
            discounts: web::Data::new(discounts),
            rentals: web::Data::new(rentals),
            line_builder: web::Data::new(line_builder),
            invoices: web::Data::new(invoices),
        })
    }

    /// Register shared state, extractor error handlers and every route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.tariffs.clone())
            .app_data(self.discounts.clone())
            .app_data(self.rentals.clone())
            .app_data(self.line_builder.clone())
            .app_data(self.invoices.clone());

        configure_extractors(cfg);
        health::configure(cfg);
        tariffs::controllers::configure(cfg);
        rentals::controllers::configure(cfg);
        invoices::controllers::configure(cfg);
    }
}
