// Tariffs module: discount definitions and the discount resolver

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Discount, Tariff, TariffKind};
pub use repositories::{MySqlTariffRepository, TariffRepository};
pub use services::{DiscountResolver, TariffService};
