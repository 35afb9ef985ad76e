use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::core::error::AppError;
use crate::core::money::{iva_for, validate_amount};
use crate::core::{round_money, BusinessClock, Result};
use crate::modules::invoices::models::{
    lines_subtotal, CreateInvoiceRequest, CreatedInvoice, DiscountedTotals, Invoice,
    InvoiceChanges, InvoiceFilter, InvoiceView, NewInvoice, NewInvoiceDetail,
};
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::tariffs::models::Discount;
use crate::modules::tariffs::DiscountResolver;

/// Service for invoice business logic
#[derive(Clone)]
pub struct InvoiceService {
    repo: Arc<dyn InvoiceRepository>,
    discounts: DiscountResolver,
    clock: BusinessClock,
    iva_rate: Decimal,
}

impl InvoiceService {
    pub fn new(
        repo: Arc<dyn InvoiceRepository>,
        discounts: DiscountResolver,
        clock: BusinessClock,
        iva_rate: Decimal,
    ) -> Self {
        Self {
            repo,
            discounts,
            clock,
            iva_rate,
        }
    }

    /// Create an invoice with its details in one transaction.
    ///
    /// Subtotal, iva and total fall back to computed values when the request
    /// does not supply them. The tariff discount is never applied here.
    pub async fn create_invoice(&self, request: CreateInvoiceRequest) -> Result<CreatedInvoice> {
        let status_id = request
            .status_id
            .ok_or_else(|| AppError::validation("Invoice status (idestado) is required"))?;
        let client_id = request
            .client_id
            .ok_or_else(|| AppError::validation("Invoice client (idcliente) is required"))?;

        if request.details.is_empty() {
            return Err(AppError::validation(
                "Invoice must have at least one detail line",
            ));
        }

        let details = request
            .details
            .iter()
            .enumerate()
            .map(|(i, d)| NewInvoiceDetail::from_request(d, i + 1))
            .collect::<Result<Vec<_>>>()?;

        let subtotal = match request.subtotal {
            Some(value) => round_money(value),
            None => lines_subtotal(details.iter().map(|d| (d.quantity, d.unit_price)))
                .ok_or_else(|| AppError::validation("Invoice subtotal is too large"))?,
        };
        checked_amount("subtotal", subtotal)?;

        let iva = match request.iva {
            Some(value) => round_money(value),
            None => iva_for(subtotal, self.iva_rate),
        };
        checked_amount("iva", iva)?;

        let total = match request.total {
            Some(value) => round_money(value),
            None => round_money(subtotal + iva),
        };
        checked_amount("total", total)?;

        let header = NewInvoice {
            issued_at: self.clock.now(),
            subtotal,
            iva,
            total,
            status_id,
            client_id: Some(client_id),
        };

        let created = self.repo.create(&header, &details).await?;

        tracing::info!(
            invoice_id = created.invoice.id,
            number = %created.invoice.number,
            client_id,
            lines = created.details.len(),
            total = %created.invoice.total,
            "Invoice created"
        );

        Ok(created)
    }

    /// Fetch one invoice, with its details when asked
    pub async fn get_invoice(&self, id: i64, include_details: bool) -> Result<InvoiceView> {
        let invoice = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| invoice_not_found(id))?;

        let mut view = InvoiceView::from(invoice);
        if include_details {
            view.details = Some(self.repo.find_details(id).await?);
        }

        Ok(view)
    }

    pub async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        self.repo.list(filter).await
    }

    /// Update header fields only
    pub async fn update_invoice(&self, changes: InvoiceChanges) -> Result<Invoice> {
        changes.validate()?;

        let updated = self
            .repo
            .update(&changes.rounded())
            .await?
            .ok_or_else(|| invoice_not_found(changes.id))?;

        tracing::info!(invoice_id = updated.id, "Invoice updated");
        Ok(updated)
    }

    /// Delete details and header, returning the deleted header
    pub async fn delete_invoice(&self, id: i64) -> Result<Invoice> {
        let deleted = self
            .repo
            .delete(id)
            .await?
            .ok_or_else(|| invoice_not_found(id))?;

        tracing::info!(invoice_id = id, number = %deleted.number, "Invoice deleted");
        Ok(deleted)
    }

    /// Overlay the promotional (today) and at-issue tariff discounts.
    ///
    /// Display only; stored amounts are untouched.
    pub async fn render_with_discount(&self, view: InvoiceView) -> Result<InvoiceView> {
        let today = self.clock.today();
        let issued_on = self.clock.local_date(view.invoice.issued_at);

        let promotional = self.discounts.resolve_discount(today).await?;
        let at_issue = if issued_on == today {
            promotional.clone()
        } else {
            self.discounts.resolve_discount(issued_on).await?
        };

        Ok(overlay(view, promotional, at_issue))
    }

    /// Same overlay for a whole listing; tariffs are read once
    pub async fn render_all_with_discount(
        &self,
        invoices: Vec<Invoice>,
    ) -> Result<Vec<InvoiceView>> {
        let today = self.clock.today();
        let mut dates: HashSet<_> = invoices
            .iter()
            .map(|invoice| self.clock.local_date(invoice.issued_at))
            .collect();
        dates.insert(today);

        let discounts = self.discounts.resolve_discounts(dates).await?;
        let promotional = discounts
            .get(&today)
            .cloned()
            .unwrap_or_else(|| Discount::none(today));

        Ok(invoices
            .into_iter()
            .map(|invoice| {
                let issued_on = self.clock.local_date(invoice.issued_at);
                let at_issue = discounts
                    .get(&issued_on)
                    .cloned()
                    .unwrap_or_else(|| Discount::none(issued_on));
                overlay(InvoiceView::from(invoice), promotional.clone(), at_issue)
            })
            .collect())
    }
}

fn overlay(mut view: InvoiceView, promotional: Discount, at_issue: Discount) -> InvoiceView {
    view.promotional = Some(DiscountedTotals::compute(&view.invoice, promotional));
    view.at_issue = Some(DiscountedTotals::compute(&view.invoice, at_issue));
    view
}

/// Rejects amounts a money column cannot store
fn checked_amount(field: &str, amount: Decimal) -> Result<()> {
    validate_amount(amount)
        .map_err(|e| AppError::validation(format!("Invoice {} {}", field, e)))
}

fn invoice_not_found(id: i64) -> AppError {
    AppError::not_found(format!("Invoice {} not found", id))
}
