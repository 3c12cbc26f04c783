//! Line and order amounts in exact decimal arithmetic.
//!
//! Amounts never pass through floating point. Overflow is reported instead of
//! panicking.

use rust_decimal::Decimal;

use bookstore_core::{DomainError, DomainResult};

/// Currency scale used for the zero amount, so an empty order totals `0.00`.
const CURRENCY_SCALE: u32 = 2;

/// Net amount of one line: `unit_price * quantity`.
pub fn net_amount(unit_price: Decimal, quantity: u32) -> DomainResult<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| DomainError::validation("net amount overflows decimal range"))
}

/// Sum of line amounts.
pub fn total_of(amounts: impl IntoIterator<Item = Decimal>) -> DomainResult<Decimal> {
    amounts.into_iter().try_fold(Decimal::new(0, CURRENCY_SCALE), |acc, amount| {
        acc.checked_add(amount)
            .ok_or_else(|| DomainError::validation("order total overflows decimal range"))
    })
}
