//! Decimal rounding rules shared by every money value

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places for money values
pub const MONEY_SCALE: u32 = 2;

/// Decimal places kept for per-unit rates
pub const RATE_SCALE: u32 = 6;

/// Billable hours in an average month
pub const HOURS_PER_MONTH: u32 = 730;

/// Round a money value to cents, half away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a per-unit rate, dropping trailing zeros
pub fn round_rate(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Multiply every factor, `None` when the result leaves the `Decimal` range
pub fn checked_product(factors: &[Decimal]) -> Option<Decimal> {
    factors
        .iter()
        .try_fold(Decimal::ONE, |acc, factor| acc.checked_mul(*factor))
}

/// Add every value, `None` when the result leaves the `Decimal` range
pub fn checked_sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
}
