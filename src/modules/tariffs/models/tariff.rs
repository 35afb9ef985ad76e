// Tariff model
//
// A tariff is a named, time-scoped percentage discount. Its name is a Spanish
// weekday ("Lunes") for kind `descuento` or a month ("Enero") for kind `mes`.
// Other kinds are stored and listed but never take part in discounts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::calendar::{fold_name, parse_month, parse_weekday};
use crate::core::money::validate_fraction;
use crate::core::nullable::present_or_null;
use crate::core::{AppError, Result};

/// Maximum decimal places accepted for a tariff value
pub const TARIFF_VALUE_SCALE: u32 = 4;

const MAX_NAME_LENGTH: usize = 100;

/// Discount category of a tariff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TariffKind {
    /// Per-weekday discount (`descuento`)
    WeekdayDiscount,
    /// Per-month discount (`mes`)
    MonthDiscount,
    /// Any other category, kept verbatim
    Other(String),
}

impl TariffKind {
    pub fn as_str(&self) -> &str {
        match self {
            TariffKind::WeekdayDiscount => "descuento",
            TariffKind::MonthDiscount => "mes",
            TariffKind::Other(raw) => raw,
        }
    }
}

impl From<String> for TariffKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "descuento" => TariffKind::WeekdayDiscount,
            "mes" => TariffKind::MonthDiscount,
            _ => TariffKind::Other(raw),
        }
    }
}

impl From<TariffKind> for String {
    fn from(kind: TariffKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for TariffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted tariff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    #[serde(rename = "idtarifa")]
    pub id: i64,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "tipo")]
    pub kind: TariffKind,

    /// Fraction in [0, 1] taken off the subtotal
    #[serde(rename = "valor")]
    pub value: Decimal,

    #[serde(rename = "fecha_inicio")]
    pub starts_on: NaiveDate,

    /// Open-ended when absent
    #[serde(rename = "fecha_fin")]
    pub ends_on: Option<NaiveDate>,

    #[serde(rename = "activa")]
    pub active: bool,
}

impl Tariff {
    /// Active flag set and `date` inside the activation window
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.active
            && self.starts_on <= date
            && self.ends_on.map_or(true, |end| end >= date)
    }

    /// Same kind and same name, ignoring case and accents
    pub fn matches(&self, kind: &TariffKind, name: &str) -> bool {
        &self.kind == kind && fold_name(&self.name) == fold_name(name)
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.name,
            &self.kind,
            self.value,
            self.starts_on,
            self.ends_on,
        )
    }
}

/// POST body for a new tariff
#[derive(Debug, Clone, Deserialize)]
pub struct NewTariff {
    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "tipo")]
    pub kind: TariffKind,

    #[serde(rename = "valor")]
    pub value: Decimal,

    #[serde(rename = "fecha_inicio")]
    pub starts_on: NaiveDate,

    #[serde(rename = "fecha_fin", default)]
    pub ends_on: Option<NaiveDate>,

    /// Defaults to true
    #[serde(rename = "activa", default)]
    pub active: Option<bool>,
}

impl NewTariff {
    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.name,
            &self.kind,
            self.value,
            self.starts_on,
            self.ends_on,
        )
    }

    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

/// PUT body: `idtarifa` plus any subset of fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TariffPatch {
    #[serde(rename = "idtarifa")]
    pub id: i64,

    #[serde(rename = "nombre", default)]
    pub name: Option<String>,

    #[serde(rename = "tipo", default)]
    pub kind: Option<TariffKind>,

    #[serde(rename = "valor", default)]
    pub value: Option<Decimal>,

    #[serde(rename = "fecha_inicio", default)]
    pub starts_on: Option<NaiveDate>,

    /// `null` clears the end date, absence leaves it untouched
    #[serde(rename = "fecha_fin", default, deserialize_with = "present_or_null")]
    pub ends_on: Option<Option<NaiveDate>>,

    #[serde(rename = "activa", default)]
    pub active: Option<bool>,
}

impl TariffPatch {
    /// Only the active flag is being changed
    pub fn is_status_only(&self) -> bool {
        self.active.is_some()
            && self.name.is_none()
            && self.kind.is_none()
            && self.value.is_none()
            && self.starts_on.is_none()
            && self.ends_on.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
            && self.name.is_none()
            && self.kind.is_none()
            && self.value.is_none()
            && self.starts_on.is_none()
            && self.ends_on.is_none()
    }

    /// Merge onto the stored tariff and validate the result
    pub fn apply_to(&self, current: &Tariff) -> Result<Tariff> {
        let merged = Tariff {
            id: current.id,
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            kind: self.kind.clone().unwrap_or_else(|| current.kind.clone()),
            value: self.value.unwrap_or(current.value),
            starts_on: self.starts_on.unwrap_or(current.starts_on),
            ends_on: self.ends_on.unwrap_or(current.ends_on),
            active: self.active.unwrap_or(current.active),
        };

        merged.validate()?;
        Ok(merged)
    }
}

fn validate_fields(
    name: &str,
    kind: &TariffKind,
    value: Decimal,
    starts_on: NaiveDate,
    ends_on: Option<NaiveDate>,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Tariff name cannot be empty"));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Tariff name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }

    validate_fraction(value, TARIFF_VALUE_SCALE)
        .map_err(|e| AppError::validation(format!("Tariff value {}", e)))?;

    if let Some(end) = ends_on {
        if end < starts_on {
            return Err(AppError::validation(format!(
                "Tariff end date {} is before start date {}",
                end, starts_on
            )));
        }
    }

    match kind {
        TariffKind::WeekdayDiscount if parse_weekday(name).is_none() => {
            Err(AppError::validation(format!(
                "Tariff of kind 'descuento' must be named after a weekday, got '{}'",
                name
            )))
        }
        TariffKind::MonthDiscount if parse_month(name).is_none() => {
            Err(AppError::validation(format!(
                "Tariff of kind 'mes' must be named after a month, got '{}'",
                name
            )))
        }
        _ => Ok(()),
    }
}
