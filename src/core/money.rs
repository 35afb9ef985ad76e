use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for every stored amount
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `DECIMAL(12, 2)` column holds: 9_999_999_999.99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, MONEY_SCALE);

/// Rounds an amount to cents, midpoint away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Amount of value-added tax for a subtotal
pub fn iva_for(subtotal: Decimal, iva_rate: Decimal) -> Decimal {
    round_money(subtotal * iva_rate)
}

/// Validates an amount that will be stored in a money column
pub fn validate_amount(amount: Decimal) -> Result<(), String> {
    if amount < Decimal::ZERO {
        return Err(format!("{} cannot be negative", amount));
    }

    if amount > MAX_AMOUNT {
        return Err(format!("{} exceeds the maximum of {}", amount, MAX_AMOUNT));
    }

    Ok(())
}

/// Like [`validate_amount`], but also rejects sub-cent digits
pub fn validate_cents(amount: Decimal) -> Result<(), String> {
    validate_amount(amount)?;

    if amount.normalize().scale() > MONEY_SCALE {
        return Err(format!(
            "{} cannot have more than {} decimal places",
            amount, MONEY_SCALE
        ));
    }

    Ok(())
}

/// Validates a fraction in [0, 1] with at most `max_scale` decimal places
pub fn validate_fraction(value: Decimal, max_scale: u32) -> Result<(), String> {
    if value < Decimal::ZERO {
        return Err(format!("{} cannot be negative", value));
    }

    if value > Decimal::ONE {
        return Err(format!("{} cannot exceed 1.0 (100%)", value));
    }

    if value.normalize().scale() > max_scale {
        return Err(format!(
            "{} cannot have more than {} decimal places",
            value, max_scale
        ));
    }

    Ok(())
}
