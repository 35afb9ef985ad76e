pub mod invoice_service;
pub mod line_builder;

pub use invoice_service::InvoiceService;
pub use line_builder::LineBuilder;
