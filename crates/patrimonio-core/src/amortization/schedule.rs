//! French (constant-payment) amortization schedule generation.
//!
//! Per-installment figures are rounded to 2 decimals; the cumulative
//! rounding residue is absorbed by the final installment so the closing
//! balance is exactly zero.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PatrimonioError;
use crate::types::{with_metadata, ComputationOutput, LoanKind, Money, Periodicity, Rate};
use crate::PatrimonioResult;

use super::iterative_pow_recip;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// Loan terms for schedule generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    /// Outstanding principal at origination.
    pub principal: Money,
    /// Nominal annual rate as a percentage (3.5 = 3.5%).
    pub tasa_anual_pct: Rate,
    /// Number of installments.
    pub plazo: u32,
    /// Payment frequency; one-off is rejected.
    pub periodicidad: Periodicity,
    /// First installment is due one period after this date.
    pub fecha_inicio: NaiveDate,
    /// Determines the linked expense branch in the application layer.
    pub tipo: LoanKind,
}

/// One row of the amortization schedule. `numero` is the stable identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub numero: u32,
    pub vencimiento: NaiveDate,
    /// Gross payment: interest + principal.
    pub cuota: Money,
    pub interes: Money,
    pub amortizacion: Money,
    /// Remaining balance after this payment.
    pub saldo_pendiente: Money,
    pub pagada: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub cuotas: Vec<Installment>,
    /// Constant periodic payment (the final row may differ by the residue).
    pub cuota_constante: Money,
    pub intereses_totales: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate the full French amortization schedule for a loan.
pub fn generate_schedule(
    input: &LoanInput,
) -> PatrimonioResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;

    let periods_per_year = input.periodicidad.periods_per_year()?;
    let period_rate = input.tasa_anual_pct / dec!(100) / periods_per_year;
    let payment = constant_payment(input.principal, period_rate, input.plazo)?;

    if input.tasa_anual_pct > dec!(20) {
        warnings.push(format!(
            "Annual rate of {}% is unusually high for a household loan",
            input.tasa_anual_pct
        ));
    }

    let months_step = input.periodicidad.months_per_period()?;
    let cuotas = amortize_rows(
        input.principal,
        period_rate,
        payment,
        input.plazo,
        input.fecha_inicio,
        months_step,
        1,
        1,
    )?;

    let intereses_totales: Money = cuotas.iter().map(|c| c.interes).sum();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "French Amortization (constant payment)",
        input,
        warnings,
        elapsed,
        ScheduleOutput {
            cuotas,
            cuota_constante: payment,
            intereses_totales,
        },
    ))
}

// ---------------------------------------------------------------------------
// Shared schedule arithmetic
// ---------------------------------------------------------------------------

/// Constant periodic payment: `P·i / (1 − (1+i)^−n)`, or `P/n` at zero rate.
/// Rounded to 2 decimals.
pub(crate) fn constant_payment(
    principal: Money,
    period_rate: Rate,
    n: u32,
) -> PatrimonioResult<Money> {
    if n == 0 {
        return Err(PatrimonioError::InvalidInput {
            field: "plazo".into(),
            reason: "Term must be greater than zero".into(),
        });
    }

    if period_rate.is_zero() {
        return Ok((principal / Decimal::from(n)).round_dp(2));
    }

    let denom = Decimal::ONE - iterative_pow_recip(Decimal::ONE + period_rate, n);
    if denom.is_zero() {
        return Err(PatrimonioError::DivisionByZero {
            context: "annuity factor".into(),
        });
    }

    Ok((principal * period_rate / denom).round_dp(2))
}

/// Produce `n` consecutive installment rows amortizing `seed_balance` with a
/// fixed `payment`. Row k is due `(first_due_offset + k − 1) · months_step`
/// months after `anchor_date` — always stepped from the anchor, so
/// day-of-month is preserved where the calendar allows (chrono clamps short
/// months). Numbering starts at `first_numero`. The final row absorbs the
/// rounding residue.
pub(crate) fn amortize_rows(
    seed_balance: Money,
    period_rate: Rate,
    payment: Money,
    n: u32,
    anchor_date: NaiveDate,
    months_step: u32,
    first_numero: u32,
    first_due_offset: u32,
) -> PatrimonioResult<Vec<Installment>> {
    let first_interest = (seed_balance * period_rate).round_dp(2);
    if n > 1 && payment <= first_interest {
        return Err(PatrimonioError::FinancialImpossibility(format!(
            "Payment {payment} does not cover the periodic interest {first_interest}"
        )));
    }

    let mut cuotas = Vec::with_capacity(n as usize);
    let mut balance = seed_balance;

    for k in 1..=n {
        let vencimiento = anchor_date
            .checked_add_months(Months::new((first_due_offset + k - 1) * months_step))
            .ok_or_else(|| {
                PatrimonioError::DateError(format!(
                    "Due date overflow stepping {k} periods from {anchor_date}"
                ))
            })?;

        let interes = (balance * period_rate).round_dp(2);
        let amortizacion = if k == n {
            // Absorb the cumulative rounding residue; closes at exactly zero.
            balance
        } else {
            payment - interes
        };
        let cuota = interes + amortizacion;
        balance -= amortizacion;

        cuotas.push(Installment {
            numero: first_numero + k - 1,
            vencimiento,
            cuota,
            interes,
            amortizacion,
            saldo_pendiente: balance,
            pagada: false,
        });
    }

    Ok(cuotas)
}

fn validate(input: &LoanInput) -> PatrimonioResult<()> {
    if input.plazo == 0 {
        return Err(PatrimonioError::InvalidInput {
            field: "plazo".into(),
            reason: "Term must be greater than zero".into(),
        });
    }
    if input.principal <= Decimal::ZERO {
        return Err(PatrimonioError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if input.tasa_anual_pct < Decimal::ZERO {
        return Err(PatrimonioError::InvalidInput {
            field: "tasa_anual_pct".into(),
            reason: "Annual rate cannot be negative".into(),
        });
    }
    if !input.periodicidad.is_recurring() {
        return Err(PatrimonioError::InvalidInput {
            field: "periodicidad".into(),
            reason: "A loan cannot have a one-off periodicity".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
