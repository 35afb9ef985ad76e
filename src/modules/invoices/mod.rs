// Invoices module: invoice engine, draft line builder and display discounts

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{CreatedInvoice, Invoice, InvoiceDetail, InvoiceDraft, InvoiceView};
pub use repositories::{InvoiceRepository, MySqlInvoiceRepository};
pub use services::{InvoiceService, LineBuilder};
