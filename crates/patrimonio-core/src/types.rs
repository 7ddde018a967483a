use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PatrimonioError;
use crate::PatrimonioResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates. Loan rates arrive as annual percentages (3.5 = 3.5%); internal
/// per-period rates are decimals (0.0029...). The field docs say which.
pub type Rate = Decimal;

/// Tenant identifier. Every record carries one and every aggregation
/// filters by it.
pub type UserId = String;

/// Payment / income frequency.
///
/// `PAGO ÚNICO` is accepted as a legacy spelling alias and normalized to
/// `PAGO_UNICO` at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Periodicity {
    #[serde(rename = "MENSUAL")]
    Mensual,
    #[serde(rename = "TRIMESTRAL")]
    Trimestral,
    #[serde(rename = "SEMESTRAL")]
    Semestral,
    #[serde(rename = "ANUAL")]
    Anual,
    #[serde(rename = "PAGO_UNICO", alias = "PAGO UNICO", alias = "PAGO ÚNICO")]
    PagoUnico,
}

impl Periodicity {
    /// Calendar months between consecutive periods.
    pub fn months_per_period(&self) -> PatrimonioResult<u32> {
        match self {
            Periodicity::Mensual => Ok(1),
            Periodicity::Trimestral => Ok(3),
            Periodicity::Semestral => Ok(6),
            Periodicity::Anual => Ok(12),
            Periodicity::PagoUnico => Err(PatrimonioError::InvalidInput {
                field: "periodicidad".into(),
                reason: "One-off movements have no period length".into(),
            }),
        }
    }

    pub fn periods_per_year(&self) -> PatrimonioResult<Decimal> {
        match self {
            Periodicity::Mensual => Ok(dec!(12)),
            Periodicity::Trimestral => Ok(dec!(4)),
            Periodicity::Semestral => Ok(dec!(2)),
            Periodicity::Anual => Ok(Decimal::ONE),
            Periodicity::PagoUnico => Err(PatrimonioError::InvalidInput {
                field: "periodicidad".into(),
                reason: "One-off movements have no annual frequency".into(),
            }),
        }
    }

    /// One-off movements count toward realized totals but never toward budget.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Periodicity::PagoUnico)
    }
}

/// Expense segment: daily spend is tracked apart from scheduled expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    #[serde(rename = "COTIDIANO")]
    Cotidiano,
    #[serde(rename = "GESTIONABLE")]
    Gestionable,
}

/// Loan classification; determines the linked expense branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanKind {
    #[serde(rename = "HIPOTECA")]
    Hipoteca,
    #[serde(rename = "PERSONAL")]
    Personal,
}

/// Percentage variation of `curr` against `prev`.
///
/// `(curr − prev)/prev · 100` when `prev > 0`; otherwise 100 if `curr > 0`
/// else 0 — "appeared from nothing" counts as a full swing, and a zero
/// denominator never divides.
pub fn pct_variation(prev: Money, curr: Money) -> Decimal {
    if prev > Decimal::ZERO {
        (curr - prev) / prev * dec!(100)
    } else if curr > Decimal::ZERO {
        dec!(100)
    } else {
        Decimal::ZERO
    }
}

/// Standard computation output envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
