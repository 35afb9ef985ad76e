use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::tariff::{Tariff, TariffKind};
use crate::core::calendar::{month_name, weekday_name};
use crate::core::round_money;

/// Discount in force on one date.
///
/// Weekday and month fractions stack additively (0.10 + 0.05 = 0.15, not
/// 1 - 0.90 * 0.95); the combined fraction is clamped to [0, 1] so a
/// discounted subtotal never goes negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discount {
    #[serde(rename = "fecha")]
    pub date: NaiveDate,

    #[serde(rename = "dia")]
    pub weekday: &'static str,

    #[serde(rename = "mes")]
    pub month: &'static str,

    #[serde(rename = "idtarifa_dia")]
    pub day_tariff_id: Option<i64>,

    #[serde(rename = "idtarifa_mes")]
    pub month_tariff_id: Option<i64>,

    #[serde(rename = "descuento_dia")]
    pub day_fraction: Decimal,

    #[serde(rename = "descuento_mes")]
    pub month_fraction: Decimal,

    #[serde(rename = "descuento_total")]
    pub total: Decimal,
}

impl Discount {
    /// Resolve from a set of tariffs. Inactive or out-of-window tariffs are
    /// ignored; when several match one category the newest (highest id) wins.
    pub fn from_tariffs(tariffs: &[Tariff], date: NaiveDate) -> Self {
        let weekday = weekday_name(date);
        let month = month_name(date);

        let day_tariff = pick(tariffs, date, &TariffKind::WeekdayDiscount, weekday);
        let month_tariff = pick(tariffs, date, &TariffKind::MonthDiscount, month);

        let day_fraction = day_tariff.map_or(Decimal::ZERO, |t| t.value);
        let month_fraction = month_tariff.map_or(Decimal::ZERO, |t| t.value);
        let total = (day_fraction + month_fraction).clamp(Decimal::ZERO, Decimal::ONE);

        Self {
            date,
            weekday,
            month,
            day_tariff_id: day_tariff.map(|t| t.id),
            month_tariff_id: month_tariff.map(|t| t.id),
            day_fraction,
            month_fraction,
            total,
        }
    }

    pub fn none(date: NaiveDate) -> Self {
        Self::from_tariffs(&[], date)
    }

    /// `subtotal * (1 - total)`, rounded to cents
    pub fn apply(&self, subtotal: Decimal) -> Decimal {
        round_money(subtotal * (Decimal::ONE - self.total))
    }
}

fn pick<'a>(
    tariffs: &'a [Tariff],
    date: NaiveDate,
    kind: &TariffKind,
    name: &str,
) -> Option<&'a Tariff> {
    tariffs
        .iter()
        .filter(|t| t.is_active_on(date) && t.matches(kind, name))
        .max_by_key(|t| t.id)
}
