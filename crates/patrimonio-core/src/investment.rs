//! Investment return approximation: money-weighted return (XIRR) and MOIC
//! over dated cash flows. Contributions are negative, distributions and the
//! current valuation positive.

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PatrimonioError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PatrimonioResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentFlow {
    pub fecha: NaiveDate,
    /// Negative for contributions, positive for distributions/valuation.
    pub importe: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentInput {
    pub flujos: Vec<InvestmentFlow>,
    /// Initial guess for the annual rate (0.1 = 10%). Defaults to 10%.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimacion_inicial: Option<Rate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentOutput {
    /// Annualized money-weighted return as a decimal (0.08 = 8%).
    pub tir_anual: Rate,
    /// Distributions over contributions.
    pub moic: Decimal,
    pub total_aportado: Money,
    pub total_distribuido: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Approximate IRR and MOIC for a dated cash-flow series.
pub fn investment_returns(
    input: &InvestmentInput,
) -> PatrimonioResult<ComputationOutput<InvestmentOutput>> {
    let start = Instant::now();

    if input.flujos.len() < 2 {
        return Err(PatrimonioError::InsufficientData(
            "Return approximation requires at least 2 cash flows".into(),
        ));
    }

    let total_aportado: Money = input
        .flujos
        .iter()
        .filter(|f| f.importe < Decimal::ZERO)
        .map(|f| -f.importe)
        .sum();
    let total_distribuido: Money = input
        .flujos
        .iter()
        .filter(|f| f.importe > Decimal::ZERO)
        .map(|f| f.importe)
        .sum();

    if total_aportado.is_zero() {
        return Err(PatrimonioError::DivisionByZero {
            context: "MOIC with no contributions".into(),
        });
    }
    let moic = total_distribuido / total_aportado;

    let mut dated: Vec<(NaiveDate, Money)> =
        input.flujos.iter().map(|f| (f.fecha, f.importe)).collect();
    dated.sort_by_key(|(d, _)| *d);

    let guess = input.estimacion_inicial.unwrap_or(dec!(0.10));
    let tir_anual = xirr(&dated, guess)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Money-weighted return (XIRR, Newton-Raphson) and MOIC",
        input,
        Vec::new(),
        elapsed,
        InvestmentOutput {
            tir_anual,
            moic,
            total_aportado,
            total_distribuido,
        },
    ))
}

/// Extended IRR for irregular cash-flow dates using Newton-Raphson.
fn xirr(dated_flows: &[(NaiveDate, Money)], guess: Rate) -> PatrimonioResult<Rate> {
    let base_date = dated_flows[0].0;
    let mut rate = guess;

    for i in 0..MAX_IRR_ITERATIONS {
        let mut npv_val = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;

        for (date, amount) in dated_flows {
            let days = (*date - base_date).num_days();
            let years = Decimal::from(days) / dec!(365.25);
            let one_plus_r = Decimal::ONE + rate;

            if one_plus_r <= Decimal::ZERO {
                return Err(PatrimonioError::ConvergenceFailure {
                    function: "XIRR".into(),
                    iterations: i,
                    last_delta: npv_val,
                });
            }

            let discount = one_plus_r.powd(years);
            if discount.is_zero() {
                continue;
            }

            npv_val += amount / discount;
            dnpv -= years * amount / (one_plus_r * discount);
        }

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(PatrimonioError::ConvergenceFailure {
                function: "XIRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        rate -= npv_val / dnpv;

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(100.0) {
            rate = dec!(100.0);
        }
    }

    Err(PatrimonioError::ConvergenceFailure {
        function: "XIRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: Decimal::ZERO,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
