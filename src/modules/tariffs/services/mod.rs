pub mod discount_resolver;
pub mod tariff_service;

pub use discount_resolver::DiscountResolver;
pub use tariff_service::TariffService;
