//! Tenant-scoped domain records consumed by the aggregators.
//!
//! These are the read-model rows the reconciliation and balance modules
//! operate on. Persistence, sessions, and CRUD validation live in the
//! application layer; here the only invariant enforced is ownership:
//! every aggregation filters by `owner` before touching amounts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Periodicity, Segment, UserId};

/// A recurring or one-off income line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub owner: UserId,
    pub concepto: String,
    /// Account the income is collected into.
    pub cuenta: String,
    pub importe: Money,
    pub periodicidad: Periodicity,
    /// Inactive records are excluded from both budget and pending figures.
    pub activo: bool,
    /// Budget flag: only flagged recurring items count toward the budget.
    pub kpi: bool,
    pub cobrado: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_cobro: Option<NaiveDate>,
}

/// A recurring or one-off expense line, daily-spend or manageable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub owner: UserId,
    pub concepto: String,
    /// Account the expense is paid from.
    pub cuenta: String,
    pub importe: Money,
    pub periodicidad: Periodicity,
    pub segmento: Segment,
    pub activo: bool,
    pub kpi: bool,
    pub pagado: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_pago: Option<NaiveDate>,
}

/// A bank account with its opening-of-month snapshot and live balance.
///
/// `saldo_actual` is the source of truth for the closing balance: transfers
/// and manual liquidity adjustments mutate it outside the month's movement
/// records, so it is never derived from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub owner: UserId,
    pub id: String,
    pub nombre: String,
    pub activo: bool,
    pub saldo_inicio_mes: Money,
    pub saldo_actual: Money,
}

/// A persisted monthly closing snapshot, the historical benchmark row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyClosing {
    pub owner: UserId,
    pub anio: i32,
    pub mes: u32,
    pub ingresos_previstos: Money,
    pub ingresos_reales: Money,
    pub gastos_previstos: Money,
    pub gastos_reales: Money,
    pub resultado_previsto: Money,
    pub resultado_real: Money,
}

impl MonthlyClosing {
    /// Orderable key for "strictly before month X" comparisons.
    pub fn ordinal(&self) -> i32 {
        self.anio * 12 + self.mes as i32 - 1
    }
}
