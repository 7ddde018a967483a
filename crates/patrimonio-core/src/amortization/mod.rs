//! French amortization: constant-payment schedule generation and
//! term-reducing prepayment recalculation.

pub mod prepayment;
pub mod schedule;

pub use prepayment::{recalculate_with_prepayment, PrepaymentInput, PrepaymentOutput};
pub use schedule::{generate_schedule, Installment, LoanInput, ScheduleOutput};

use rust_decimal::Decimal;

/// Compute base^n for a positive integer exponent via iterative multiplication.
pub(crate) fn iterative_pow(base: Decimal, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result *= base;
    }
    result
}

/// Compute 1 / base^n via iterative multiplication.
pub(crate) fn iterative_pow_recip(base: Decimal, n: u32) -> Decimal {
    let pow = iterative_pow(base, n);
    if pow.is_zero() {
        Decimal::ZERO
    } else {
        Decimal::ONE / pow
    }
}
