// Unsaved invoice being assembled line by line

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::invoice::CreateInvoiceRequest;
use super::line_item::CreateDetailRequest;
use crate::core::money::iva_for;
use crate::core::round_money;

/// Priced line in a draft
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineDraft {
    #[serde(rename = "linea")]
    pub line_id: u32,

    #[serde(rename = "idproducto")]
    pub product_id: i64,

    #[serde(rename = "concepto")]
    pub concept: String,

    #[serde(rename = "cantidad")]
    pub quantity: i32,

    #[serde(rename = "precio_unitario")]
    pub unit_price: Decimal,

    pub subtotal: Decimal,

    #[serde(rename = "idalquiler")]
    pub rental_id: Option<i64>,

    /// False when the client has no rental of the product today; the line is
    /// kept at a zero price
    #[serde(rename = "alquiler_encontrado")]
    pub rental_found: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub iva: Decimal,
    pub total: Decimal,
}

impl Totals {
    pub fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            iva: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDraft {
    #[serde(rename = "idcliente")]
    pub client_id: i64,

    /// Business-local date the prices were resolved for
    #[serde(rename = "fecha")]
    pub date: NaiveDate,

    #[serde(rename = "lineas")]
    pub lines: Vec<LineDraft>,

    #[serde(rename = "totales")]
    pub totals: Totals,

    #[serde(skip)]
    pub(crate) next_line_id: u32,

    #[serde(skip)]
    pub(crate) iva_rate: Decimal,
}

impl InvoiceDraft {
    pub fn new(client_id: i64, date: NaiveDate, iva_rate: Decimal) -> Self {
        Self {
            client_id,
            date,
            lines: Vec::new(),
            totals: Totals::zero(),
            next_line_id: 1,
            iva_rate,
        }
    }

    pub fn has_unpriced_lines(&self) -> bool {
        self.lines.iter().any(|l| !l.rental_found)
    }

    pub(crate) fn push_line(&mut self, mut line: LineDraft) -> LineDraft {
        line.line_id = self.next_line_id;
        self.next_line_id += 1;
        self.lines.push(line.clone());
        self.refresh_totals();
        line
    }

    /// Remove a line; None when no line has that id
    pub(crate) fn take_line(&mut self, line_id: u32) -> Option<LineDraft> {
        let index = self.lines.iter().position(|l| l.line_id == line_id)?;
        let removed = self.lines.remove(index);
        self.refresh_totals();
        Some(removed)
    }

    fn refresh_totals(&mut self) {
        self.totals = recompute_totals(&self.lines, self.iva_rate);
    }

    /// Request that persists this draft with the given status
    pub fn into_request(self, status_id: i64) -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            status_id: Some(status_id),
            client_id: Some(self.client_id),
            subtotal: Some(self.totals.subtotal),
            iva: Some(self.totals.iva),
            total: Some(self.totals.total),
            details: self
                .lines
                .into_iter()
                .map(|line| CreateDetailRequest {
                    concept: line.concept,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    rental_id: line.rental_id,
                })
                .collect(),
        }
    }
}

/// `subtotal = sum(quantity * unit_price)`, `iva = subtotal * iva_rate`,
/// `total = subtotal + iva`, each rounded to cents. No tariff discount.
pub fn recompute_totals(lines: &[LineDraft], iva_rate: Decimal) -> Totals {
    let subtotal = round_money(
        lines
            .iter()
            .map(|l| Decimal::from(l.quantity) * l.unit_price)
            .sum(),
    );
    let iva = iva_for(subtotal, iva_rate);

    Totals {
        subtotal,
        iva,
        total: round_money(subtotal + iva),
    }
}

/// POST /invoices/preview body
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewRequest {
    #[serde(rename = "idcliente")]
    pub client_id: i64,

    #[serde(rename = "productos", default)]
    pub products: Vec<PreviewProduct>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewProduct {
    #[serde(rename = "idproducto")]
    pub product_id: i64,

    /// Defaults to a label naming the product
    #[serde(rename = "concepto", default)]
    pub concept: Option<String>,

    #[serde(rename = "cantidad", default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

impl PreviewProduct {
    pub fn concept_or_default(&self) -> String {
        self.concept
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Alquiler producto {}", self.product_id))
    }
}
