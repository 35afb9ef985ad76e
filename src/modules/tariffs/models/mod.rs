mod discount;
mod tariff;

pub use discount::Discount;
pub use tariff::{NewTariff, Tariff, TariffKind, TariffPatch, TARIFF_VALUE_SCALE};
