//! Term-reducing prepayment recalculation.
//!
//! A capital prepayment lowers the outstanding balance; the periodic payment
//! stays fixed and the remaining term shrinks. Paid installments are never
//! altered. The function is pure: re-running it with the same input yields
//! the same replacement schedule, so a storage layer can retry its
//! delete-then-insert transaction safely.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PatrimonioError;
use crate::types::{with_metadata, ComputationOutput, Money, Periodicity, Rate};
use crate::PatrimonioResult;

use super::schedule::{amortize_rows, Installment};

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentInput {
    /// Full current schedule, paid and unpaid rows mixed.
    pub cuotas: Vec<Installment>,
    /// Nominal annual rate as a percentage (3.5 = 3.5%).
    pub tasa_anual_pct: Rate,
    pub periodicidad: Periodicity,
    /// Capital prepayment amount.
    pub importe: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentOutput {
    /// Paid installments, echoed back untouched.
    pub cuotas_pagadas: Vec<Installment>,
    /// Replacement schedule for the unpaid remainder.
    pub cuotas_nuevas: Vec<Installment>,
    /// Outstanding balance after applying the prepayment.
    pub saldo_tras_amortizacion: Money,
    /// Length of the replacement schedule.
    pub nuevo_plazo: u32,
    /// True when the prepayment cleared the loan entirely.
    pub liquidado: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Apply a capital prepayment and regenerate the unpaid remainder of the
/// schedule, keeping the original periodic payment and shortening the term.
pub fn recalculate_with_prepayment(
    input: &PrepaymentInput,
) -> PatrimonioResult<ComputationOutput<PrepaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;

    let cuotas_pagadas: Vec<Installment> =
        input.cuotas.iter().filter(|c| c.pagada).cloned().collect();
    let unpaid: Vec<&Installment> = input.cuotas.iter().filter(|c| !c.pagada).collect();

    let first_unpaid = unpaid.first().ok_or_else(|| PatrimonioError::InvalidInput {
        field: "cuotas".into(),
        reason: "Every installment is already paid".into(),
    })?;

    // Balance owed just before the first unpaid installment.
    let outstanding = first_unpaid.saldo_pendiente + first_unpaid.amortizacion;
    let balance = outstanding - input.importe;

    if balance <= Decimal::ZERO {
        if balance < Decimal::ZERO {
            warnings.push(format!(
                "Prepayment exceeds the outstanding balance by {}",
                -balance
            ));
        }
        let elapsed = start.elapsed().as_micros() as u64;
        return Ok(with_metadata(
            "Term-reducing prepayment (fully amortized)",
            input,
            warnings,
            elapsed,
            PrepaymentOutput {
                cuotas_pagadas,
                cuotas_nuevas: Vec::new(),
                saldo_tras_amortizacion: Decimal::ZERO,
                nuevo_plazo: 0,
                liquidado: true,
            },
        ));
    }

    let periods_per_year = input.periodicidad.periods_per_year()?;
    let period_rate = input.tasa_anual_pct / dec!(100) / periods_per_year;
    let payment = first_unpaid.cuota;

    let nuevo_plazo = solve_term(balance, period_rate, payment)?;

    let months_step = input.periodicidad.months_per_period()?;
    let first_numero = cuotas_pagadas.last().map(|c| c.numero).unwrap_or(0) + 1;
    let cuotas_nuevas = amortize_rows(
        balance,
        period_rate,
        payment,
        nuevo_plazo,
        first_unpaid.vencimiento,
        months_step,
        first_numero,
        0,
    )?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Term-reducing prepayment (fixed payment, recomputed term)",
        input,
        warnings,
        elapsed,
        PrepaymentOutput {
            cuotas_pagadas,
            cuotas_nuevas,
            saldo_tras_amortizacion: balance,
            nuevo_plazo,
            liquidado: false,
        },
    ))
}

/// Smallest term `n` such that payment `a` at per-period rate `i` amortizes
/// balance `b`: `n = ceil(−ln(1 − i·b/a) / ln(1+i))`, or `ceil(b/a)` at zero
/// rate.
fn solve_term(b: Money, i: Rate, a: Money) -> PatrimonioResult<u32> {
    if a <= Decimal::ZERO {
        return Err(PatrimonioError::InvalidInput {
            field: "cuota".into(),
            reason: "Periodic payment must be positive".into(),
        });
    }

    let n = if i.is_zero() {
        (b / a).ceil()
    } else {
        let ratio = i * b / a;
        if ratio >= Decimal::ONE {
            return Err(PatrimonioError::FinancialImpossibility(format!(
                "Payment {a} does not cover the periodic interest on balance {b}"
            )));
        }
        let numer = -(Decimal::ONE - ratio).ln();
        let denom = (Decimal::ONE + i).ln();
        if denom.is_zero() {
            return Err(PatrimonioError::DivisionByZero {
                context: "log of growth factor in term solve".into(),
            });
        }
        (numer / denom).ceil()
    };

    n.to_u32().ok_or_else(|| PatrimonioError::InvalidInput {
        field: "plazo".into(),
        reason: format!("Recomputed term {n} is not a valid period count"),
    })
}

fn validate(input: &PrepaymentInput) -> PatrimonioResult<()> {
    if input.cuotas.is_empty() {
        return Err(PatrimonioError::InvalidInput {
            field: "cuotas".into(),
            reason: "Schedule is empty".into(),
        });
    }
    if input.importe <= Decimal::ZERO {
        return Err(PatrimonioError::InvalidInput {
            field: "importe".into(),
            reason: "Prepayment amount must be positive".into(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::schedule::{generate_schedule, LoanInput};
    use crate::types::LoanKind;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn base_schedule() -> Vec<Installment> {
        let input = LoanInput {
            principal: dec!(10000),
            tasa_anual_pct: dec!(5),
            plazo: 24,
            periodicidad: Periodicity::Mensual,
            fecha_inicio: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            tipo: LoanKind::Personal,
        };
        generate_schedule(&input).unwrap().result.cuotas
    }

    fn with_paid(mut cuotas: Vec<Installment>, paid: usize) -> Vec<Installment> {
        for c in cuotas.iter_mut().take(paid) {
            c.pagada = true;
        }
        cuotas
    }

    fn prepay_input(importe: Decimal, paid: usize) -> PrepaymentInput {
        PrepaymentInput {
            cuotas: with_paid(base_schedule(), paid),
            tasa_anual_pct: dec!(5),
            periodicidad: Periodicity::Mensual,
            importe,
        }
    }

    #[test]
    fn test_paid_installments_untouched() {
        let input = prepay_input(dec!(2000), 6);
        let out = recalculate_with_prepayment(&input).unwrap().result;
        let expected: Vec<Installment> = input.cuotas[..6].to_vec();
        assert_eq!(out.cuotas_pagadas, expected);
    }

    #[test]
    fn test_new_schedule_conserves_reduced_balance() {
        let input = prepay_input(dec!(2000), 6);
        let out = recalculate_with_prepayment(&input).unwrap().result;
        assert!(!out.liquidado);
        let total: Decimal = out.cuotas_nuevas.iter().map(|c| c.amortizacion).sum();
        assert_eq!(total, out.saldo_tras_amortizacion);
        assert_eq!(
            out.cuotas_nuevas.last().unwrap().saldo_pendiente,
            Decimal::ZERO
        );
    }

    #[test]
    fn test_term_is_shortened() {
        let input = prepay_input(dec!(2000), 6);
        let out = recalculate_with_prepayment(&input).unwrap().result;
        // 18 unpaid installments before; the prepayment must shave some off.
        assert!(out.nuevo_plazo < 18);
        assert!(out.nuevo_plazo > 0);
        assert_eq!(out.cuotas_nuevas.len(), out.nuevo_plazo as usize);
    }

    #[test]
    fn test_payment_kept_fixed() {
        let input = prepay_input(dec!(2000), 6);
        let original_payment = input.cuotas[6].cuota;
        let out = recalculate_with_prepayment(&input).unwrap().result;
        for c in &out.cuotas_nuevas[..out.cuotas_nuevas.len() - 1] {
            assert_eq!(c.cuota, original_payment);
        }
    }

    #[test]
    fn test_numbering_continues_after_last_paid() {
        let input = prepay_input(dec!(2000), 6);
        let out = recalculate_with_prepayment(&input).unwrap().result;
        assert_eq!(out.cuotas_nuevas[0].numero, 7);
        for (idx, c) in out.cuotas_nuevas.iter().enumerate() {
            assert_eq!(c.numero, 7 + idx as u32);
        }
    }

    #[test]
    fn test_first_new_due_date_matches_next_due() {
        let input = prepay_input(dec!(2000), 6);
        let next_due = input.cuotas[6].vencimiento;
        let out = recalculate_with_prepayment(&input).unwrap().result;
        assert_eq!(out.cuotas_nuevas[0].vencimiento, next_due);
    }

    #[test]
    fn test_full_prepayment_liquidates_loan() {
        let input = prepay_input(dec!(50000), 6);
        let result = recalculate_with_prepayment(&input).unwrap();
        let out = result.result;
        assert!(out.liquidado);
        assert_eq!(out.nuevo_plazo, 0);
        assert!(out.cuotas_nuevas.is_empty());
        assert_eq!(out.saldo_tras_amortizacion, Decimal::ZERO);
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_zero_rate_term_is_balance_over_payment() {
        let loan = LoanInput {
            principal: dec!(1200),
            tasa_anual_pct: dec!(0),
            plazo: 12,
            periodicidad: Periodicity::Mensual,
            fecha_inicio: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            tipo: LoanKind::Personal,
        };
        let cuotas = with_paid(generate_schedule(&loan).unwrap().result.cuotas, 2);
        let input = PrepaymentInput {
            cuotas,
            tasa_anual_pct: dec!(0),
            periodicidad: Periodicity::Mensual,
            importe: dec!(500),
        };
        let out = recalculate_with_prepayment(&input).unwrap().result;
        // Balance after 2 payments of 100: 1000; minus 500 = 500; 500/100 = 5.
        assert_eq!(out.saldo_tras_amortizacion, dec!(500));
        assert_eq!(out.nuevo_plazo, 5);
    }

    #[test]
    fn test_idempotent_given_same_input() {
        let input = prepay_input(dec!(2000), 6);
        let first = recalculate_with_prepayment(&input).unwrap().result;
        let second = recalculate_with_prepayment(&input).unwrap().result;
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let input = prepay_input(dec!(0), 6);
        assert!(recalculate_with_prepayment(&input).is_err());
    }

    #[test]
    fn test_rejects_fully_paid_schedule() {
        let input = prepay_input(dec!(100), 24);
        assert!(recalculate_with_prepayment(&input).is_err());
    }

    #[test]
    fn test_payment_below_interest_is_impossible() {
        // A tampered schedule whose payment cannot even cover interest.
        let cuota = Installment {
            numero: 1,
            vencimiento: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            cuota: dec!(10),
            interes: dec!(5),
            amortizacion: dec!(5),
            saldo_pendiente: dec!(99995),
            pagada: false,
        };
        let input = PrepaymentInput {
            cuotas: vec![cuota],
            tasa_anual_pct: dec!(12),
            periodicidad: Periodicity::Mensual,
            importe: dec!(100),
        };
        let err = recalculate_with_prepayment(&input).unwrap_err();
        assert!(matches!(err, PatrimonioError::FinancialImpossibility(_)));
    }
}
