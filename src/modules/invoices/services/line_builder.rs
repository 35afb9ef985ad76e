use rust_decimal::Decimal;

use crate::core::money::validate_amount;
use crate::core::{AppError, Result};
use crate::modules::invoices::models::{
    line_subtotal, InvoiceDraft, LineDraft, PreviewRequest,
};
use crate::modules::rentals::RentalPriceResolver;

/// Builds unsaved invoices, pricing each line from the client's rental today
#[derive(Clone)]
pub struct LineBuilder {
    prices: RentalPriceResolver,
    iva_rate: Decimal,
}

impl LineBuilder {
    pub fn new(prices: RentalPriceResolver, iva_rate: Decimal) -> Self {
        Self { prices, iva_rate }
    }

    /// Empty draft for a client dated today
    pub fn start_draft(&self, client_id: i64) -> InvoiceDraft {
        InvoiceDraft::new(client_id, self.prices.today(), self.iva_rate)
    }

    /// Price and append a line; totals are recomputed.
    ///
    /// A product the client has not rented today is still added, at a zero
    /// unit price and with `rental_found` unset.
    pub async fn add_line(
        &self,
        draft: &mut InvoiceDraft,
        product_id: i64,
        concept: &str,
        quantity: i32,
    ) -> Result<LineDraft> {
        let concept = concept.trim();
        if concept.is_empty() {
            return Err(AppError::validation("Line concept cannot be empty"));
        }
        if quantity <= 0 {
            return Err(AppError::validation("Line quantity must be greater than zero"));
        }

        let resolution = self
            .prices
            .resolve_today_price(draft.client_id, product_id, draft.date)
            .await?;

        let unit_price = resolution.price_or_zero();
        let subtotal = line_subtotal(quantity, unit_price)
            .filter(|subtotal| validate_amount(*subtotal).is_ok())
            .ok_or_else(|| AppError::validation("Line subtotal is too large"))?;

        let line = draft.push_line(LineDraft {
            line_id: 0,
            product_id,
            concept: concept.to_string(),
            quantity,
            unit_price,
            subtotal,
            rental_id: resolution.rental_id(),
            rental_found: resolution.is_found(),
        });

        tracing::debug!(
            client_id = draft.client_id,
            product_id,
            line_id = line.line_id,
            rental_found = line.rental_found,
            "Draft line added"
        );

        Ok(line)
    }

    /// Drop a line and recompute totals
    pub fn remove_line(&self, draft: &mut InvoiceDraft, line_id: u32) -> Result<LineDraft> {
        draft
            .take_line(line_id)
            .ok_or_else(|| AppError::not_found(format!("Draft line {} not found", line_id)))
    }

    /// Price every requested product into a fresh draft
    pub async fn build_preview(&self, request: PreviewRequest) -> Result<InvoiceDraft> {
        if request.products.is_empty() {
            return Err(AppError::validation("At least one product is required"));
        }

        let mut draft = self.start_draft(request.client_id);
        for product in &request.products {
            self.add_line(
                &mut draft,
                product.product_id,
                &product.concept_or_default(),
                product.quantity,
            )
            .await?;
        }

        if draft.has_unpriced_lines() {
            tracing::warn!(
                client_id = draft.client_id,
                date = %draft.date,
                "Preview has products without a rental today"
            );
        }

        Ok(draft)
    }
}
