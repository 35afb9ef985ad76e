// Invoice header model
//
// An invoice is numbered from an independent sequence (first number 1001) and
// stores subtotal, iva and total as written at creation. Tariff discounts are
// never stored; they are overlaid for display by `DiscountedTotals`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line_item::{CreateDetailRequest, InvoiceDetail};
use crate::core::money::validate_amount;
use crate::core::nullable::present_or_null;
use crate::core::{round_money, AppError, Result};
use crate::modules::tariffs::Discount;

/// Number given to the first invoice when the sequence is empty
pub const DEFAULT_FIRST_INVOICE_NUMBER: i64 = 1001;

/// Persisted invoice header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "idfactura")]
    pub id: i64,

    #[serde(rename = "numero_factura")]
    pub number: String,

    #[serde(rename = "fecha")]
    pub issued_at: DateTime<Utc>,

    pub subtotal: Decimal,

    pub iva: Decimal,

    pub total: Decimal,

    #[serde(rename = "idestado")]
    pub status_id: i64,

    #[serde(rename = "idcliente")]
    pub client_id: Option<i64>,
}

/// POST body for a new invoice
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    #[serde(rename = "idestado", default)]
    pub status_id: Option<i64>,

    #[serde(rename = "idcliente", default)]
    pub client_id: Option<i64>,

    /// Overrides the sum of line subtotals
    #[serde(default)]
    pub subtotal: Option<Decimal>,

    /// Overrides subtotal * IVA rate
    #[serde(default)]
    pub iva: Option<Decimal>,

    /// Overrides subtotal + iva
    #[serde(default)]
    pub total: Option<Decimal>,

    #[serde(rename = "detalles", default)]
    pub details: Vec<CreateDetailRequest>,
}

/// Header values ready to be written; the number is assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub issued_at: DateTime<Utc>,
    pub subtotal: Decimal,
    pub iva: Decimal,
    pub total: Decimal,
    pub status_id: i64,
    pub client_id: Option<i64>,
}

/// PUT body: header fields only
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceChanges {
    #[serde(rename = "idfactura")]
    pub id: i64,

    #[serde(default)]
    pub subtotal: Option<Decimal>,

    #[serde(default)]
    pub iva: Option<Decimal>,

    #[serde(default)]
    pub total: Option<Decimal>,

    #[serde(rename = "idestado", default)]
    pub status_id: Option<i64>,

    /// `Some(None)` clears the client
    #[serde(rename = "idcliente", default, deserialize_with = "present_or_null")]
    pub client_id: Option<Option<i64>>,
}

impl InvoiceChanges {
    pub fn is_empty(&self) -> bool {
        self.subtotal.is_none()
            && self.iva.is_none()
            && self.total.is_none()
            && self.status_id.is_none()
            && self.client_id.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(AppError::validation("No invoice fields to update"));
        }

        for (field, value) in [
            ("subtotal", self.subtotal),
            ("iva", self.iva),
            ("total", self.total),
        ] {
            if let Some(amount) = value.map(round_money) {
                validate_amount(amount).map_err(|e| {
                    AppError::validation(format!("Invoice {} {}", field, e))
                })?;
            }
        }

        Ok(())
    }

    /// Changes with amounts rounded to cents
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: self.subtotal.map(round_money),
            iva: self.iva.map(round_money),
            total: self.total.map(round_money),
            ..self.clone()
        }
    }

    pub fn apply_to(&self, invoice: &Invoice) -> Invoice {
        Invoice {
            subtotal: self.subtotal.unwrap_or(invoice.subtotal),
            iva: self.iva.unwrap_or(invoice.iva),
            total: self.total.unwrap_or(invoice.total),
            status_id: self.status_id.unwrap_or(invoice.status_id),
            client_id: self.client_id.unwrap_or(invoice.client_id),
            ..invoice.clone()
        }
    }
}

/// List filters from the back-office invoice screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFilter {
    pub status_id: Option<i64>,
    pub client_id: Option<i64>,
    /// Substring of the invoice number
    pub number_contains: Option<String>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.status_id.map_or(true, |s| invoice.status_id == s)
            && self.client_id.map_or(true, |c| invoice.client_id == Some(c))
            && self
                .number_query()
                .map_or(true, |q| invoice.number.contains(q))
    }

    /// Trimmed number query, None when blank
    pub fn number_query(&self) -> Option<&str> {
        self.number_contains
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// Result of a successful creation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedInvoice {
    #[serde(rename = "factura")]
    pub invoice: Invoice,

    #[serde(rename = "detalles")]
    pub details: Vec<InvoiceDetail>,
}

/// Stored totals with a tariff discount overlaid on the subtotal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountedTotals {
    #[serde(rename = "fecha_descuento")]
    pub discount_date: NaiveDate,

    #[serde(rename = "descuento")]
    pub discount: Discount,

    #[serde(rename = "subtotal_con_descuento")]
    pub subtotal_after_discount: Decimal,

    /// Discounted subtotal plus the stored iva
    #[serde(rename = "total_mostrado")]
    pub displayed_total: Decimal,
}

impl DiscountedTotals {
    pub fn compute(invoice: &Invoice, discount: Discount) -> Self {
        let subtotal_after_discount = discount.apply(invoice.subtotal);
        let displayed_total = round_money(subtotal_after_discount + invoice.iva);

        Self {
            discount_date: discount.date,
            discount,
            subtotal_after_discount,
            displayed_total,
        }
    }
}

/// Invoice as returned by GET, optionally with details and discount views
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceView {
    #[serde(flatten)]
    pub invoice: Invoice,

    #[serde(rename = "detalles", skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<InvoiceDetail>>,

    /// Discount in force today
    #[serde(rename = "promocional", skip_serializing_if = "Option::is_none")]
    pub promotional: Option<DiscountedTotals>,

    /// Discount that was in force on the issue date
    #[serde(rename = "al_emitir", skip_serializing_if = "Option::is_none")]
    pub at_issue: Option<DiscountedTotals>,
}

impl From<Invoice> for InvoiceView {
    fn from(invoice: Invoice) -> Self {
        Self {
            invoice,
            details: None,
            promotional: None,
            at_issue: None,
        }
    }
}

/// Next invoice number after `last`.
///
/// Starts at `first` when there is no previous number or it is not numeric.
pub fn next_invoice_number(last: Option<&str>, first: i64) -> i64 {
    match last.map(str::trim).and_then(|n| n.parse::<i64>().ok()) {
        Some(n) => n.saturating_add(1),
        None => first,
    }
}
