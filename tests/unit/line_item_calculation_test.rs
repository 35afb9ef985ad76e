// Property-based tests for line subtotals and draft totals
//
// Properties tested:
// 1. line subtotal = round(quantity * unit_price, 2)
// 2. subtotal is never negative and keeps at most 2 decimal places
// 3. total = subtotal + iva, iva = round(subtotal * rate, 2)
// 4. non-positive quantities are rejected
// 5. prices with sub-cent digits are rejected

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use rental_billing::core::round_money;
use rental_billing::invoices::models::{
    line_subtotal, recompute_totals, CreateDetailRequest, LineDraft, NewInvoiceDetail,
};

fn draft_line(quantity: i32, unit_price: Decimal) -> LineDraft {
    LineDraft {
        line_id: 1,
        product_id: 7,
        concept: "Alquiler".to_string(),
        quantity,
        unit_price,
        subtotal: line_subtotal(quantity, unit_price).unwrap(),
        rental_id: None,
        rental_found: true,
    }
}

proptest! {
    /// Property: subtotal is quantity * unit_price rounded to cents
    #[test]
    fn test_line_subtotal_calculation(
        quantity in 1i32..=1000,
        unit_price_mills in 0i64..=10_000_000,
    ) {
        let unit_price = Decimal::new(unit_price_mills, 3);
        let subtotal = line_subtotal(quantity, unit_price).unwrap();

        prop_assert_eq!(subtotal, round_money(Decimal::from(quantity) * unit_price));
        prop_assert!(subtotal >= Decimal::ZERO);
        prop_assert!(subtotal.normalize().scale() <= 2);
    }

    /// Property: validated detail carries the computed subtotal
    #[test]
    fn test_detail_from_request(
        quantity in 1i32..=100,
        unit_price_cents in 0i64..=1_000_000,
    ) {
        let unit_price = Decimal::new(unit_price_cents, 2);
        let request = CreateDetailRequest {
            concept: "Alquiler patineta".to_string(),
            quantity,
            unit_price,
            rental_id: Some(1),
        };

        let detail = NewInvoiceDetail::from_request(&request, 1).unwrap();
        prop_assert_eq!(detail.subtotal, Decimal::from(quantity) * unit_price);
        prop_assert_eq!(detail.rental_id, Some(1));
    }

    /// Property: draft totals are consistent with the IVA rate
    #[test]
    fn test_draft_totals_consistency(
        lines in prop::collection::vec((1i32..=10, 0i64..=100_000), 0..8),
        rate_bp in 0i64..=10_000,
    ) {
        let iva_rate = Decimal::new(rate_bp, 4);
        let drafts: Vec<LineDraft> = lines
            .iter()
            .map(|(q, cents)| draft_line(*q, Decimal::new(*cents, 2)))
            .collect();

        let totals = recompute_totals(&drafts, iva_rate);
        let expected_subtotal: Decimal = drafts
            .iter()
            .map(|l| Decimal::from(l.quantity) * l.unit_price)
            .sum();

        prop_assert_eq!(totals.subtotal, round_money(expected_subtotal));
        prop_assert_eq!(totals.iva, round_money(totals.subtotal * iva_rate));
        prop_assert_eq!(totals.total, totals.subtotal + totals.iva);
    }

    /// Property: zero or negative quantities never validate
    #[test]
    fn test_non_positive_quantity_rejected(quantity in -1000i32..=0) {
        let request = CreateDetailRequest {
            concept: "Casco".to_string(),
            quantity,
            unit_price: dec!(5),
            rental_id: None,
        };

        prop_assert!(NewInvoiceDetail::from_request(&request, 1).is_err());
    }

    /// Property: a third decimal digit never validates
    #[test]
    fn test_sub_cent_price_rejected(
        cents in 0i64..=1_000_000,
        mills in 1i64..=9,
    ) {
        let request = CreateDetailRequest {
            concept: "Alquiler".to_string(),
            quantity: 1,
            unit_price: Decimal::new(cents * 10 + mills, 3),
            rental_id: None,
        };

        prop_assert!(NewInvoiceDetail::from_request(&request, 1).is_err());
    }
}

#[test]
fn test_midpoint_rounds_away_from_zero() {
    assert_eq!(line_subtotal(1, dec!(0.005)), Some(dec!(0.01)));
    assert_eq!(line_subtotal(3, dec!(12.345)), Some(dec!(37.04)));
}

#[test]
fn test_reference_totals() {
    let totals = recompute_totals(&[draft_line(1, dec!(20))], dec!(0.19));
    assert_eq!(totals.subtotal, dec!(20.00));
    assert_eq!(totals.iva, dec!(3.80));
    assert_eq!(totals.total, dec!(23.80));
}
