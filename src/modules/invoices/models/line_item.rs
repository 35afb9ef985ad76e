use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money::{validate_amount, validate_cents};
use crate::core::{round_money, AppError, Result};

const MAX_CONCEPT_LENGTH: usize = 255;

/// Persisted invoice detail line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDetail {
    #[serde(rename = "iddetalle")]
    pub id: i64,

    #[serde(rename = "idfactura")]
    pub invoice_id: i64,

    #[serde(rename = "concepto")]
    pub concept: String,

    #[serde(rename = "cantidad")]
    pub quantity: i32,

    #[serde(rename = "precio_unitario")]
    pub unit_price: Decimal,

    pub subtotal: Decimal,

    /// Rental the unit price was taken from
    #[serde(rename = "idalquiler")]
    pub rental_id: Option<i64>,
}

/// Detail line in a create request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDetailRequest {
    #[serde(rename = "concepto", default)]
    pub concept: String,

    #[serde(rename = "cantidad", default = "default_quantity")]
    pub quantity: i32,

    #[serde(rename = "precio_unitario", default)]
    pub unit_price: Decimal,

    #[serde(rename = "idalquiler", default)]
    pub rental_id: Option<i64>,
}

fn default_quantity() -> i32 {
    1
}

/// Validated detail line ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoiceDetail {
    pub concept: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub rental_id: Option<i64>,
}

impl NewInvoiceDetail {
    /// Validate a requested line and compute its subtotal.
    ///
    /// `position` is 1-based and only used in error messages.
    pub fn from_request(request: &CreateDetailRequest, position: usize) -> Result<Self> {
        let concept = request.concept.trim();
        if concept.is_empty() {
            return Err(AppError::validation(format!(
                "Detail {} must have a concept",
                position
            )));
        }

        if concept.len() > MAX_CONCEPT_LENGTH {
            return Err(AppError::validation(format!(
                "Detail {} concept cannot exceed {} characters",
                position, MAX_CONCEPT_LENGTH
            )));
        }

        if request.quantity <= 0 {
            return Err(AppError::validation(format!(
                "Detail {} quantity must be greater than zero",
                position
            )));
        }

        validate_cents(request.unit_price).map_err(|e| {
            AppError::validation(format!("Detail {} unit price {}", position, e))
        })?;

        let subtotal = line_subtotal(request.quantity, request.unit_price)
            .filter(|subtotal| validate_amount(*subtotal).is_ok())
            .ok_or_else(|| {
                AppError::validation(format!("Detail {} subtotal is too large", position))
            })?;

        Ok(Self {
            concept: concept.to_string(),
            quantity: request.quantity,
            unit_price: request.unit_price,
            subtotal,
            rental_id: request.rental_id,
        })
    }
}

/// `quantity * unit_price` rounded to cents; None on overflow
pub fn line_subtotal(quantity: i32, unit_price: Decimal) -> Option<Decimal> {
    Decimal::from(quantity).checked_mul(unit_price).map(round_money)
}

/// Sum of raw `quantity * unit_price` over the lines, rounded once
pub fn lines_subtotal<I>(lines: I) -> Option<Decimal>
where
    I: IntoIterator<Item = (i32, Decimal)>,
{
    lines
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, (quantity, unit_price)| {
            Decimal::from(quantity)
                .checked_mul(unit_price)
                .and_then(|amount| acc.checked_add(amount))
        })
        .map(round_money)
}
