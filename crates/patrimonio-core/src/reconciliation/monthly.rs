//! Monthly reconciliation: budget vs. actual for one (user, year, month),
//! with a trailing-12-month benchmark and narrative notes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::records::{ExpenseRecord, IncomeRecord, MonthlyClosing};
use crate::types::{pct_variation, with_metadata, ComputationOutput, Money, Segment, UserId};
use crate::PatrimonioResult;

use super::notes::{build_notes, Note, NoteContext};
use super::window::MonthWindow;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummaryInput {
    /// Caller identity; all record sets are filtered to this owner.
    pub user: UserId,
    pub anio: i32,
    pub mes: u32,
    pub ingresos: Vec<IncomeRecord>,
    pub gastos: Vec<ExpenseRecord>,
    pub cierres: Vec<MonthlyClosing>,
}

/// Budget side: active + kpi-flagged recurring items only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBudget {
    pub ingresos: Money,
    pub gastos_gestionables: Money,
    pub gasto_cotidiano: Money,
}

impl MonthlyBudget {
    pub fn gastos_total(&self) -> Money {
        self.gastos_gestionables + self.gasto_cotidiano
    }
}

/// Realized movements split into recurring and one-off subtotals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementDetail {
    pub recurrentes: Money,
    pub extraordinarios: Money,
}

/// Averages over the up-to-12 closings strictly preceding the target month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailingBenchmark {
    /// Number of closing rows actually available (1..=12).
    pub meses: u32,
    pub media_ingresos: Money,
    pub media_gastos: Money,
    pub media_resultado: Money,
    /// Current-month income vs. the average, as a percentage.
    pub desviacion_ingresos_pct: Decimal,
    pub desviacion_gastos_pct: Decimal,
    /// Annualized projection: trailing average result × 12.
    pub run_rate_anual: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub anio: i32,
    pub mes: u32,
    pub presupuesto: MonthlyBudget,
    pub ingresos_mes: Money,
    pub gastos_mes: Money,
    pub resultado_mes: Money,
    pub detalle_ingresos: MovementDetail,
    pub detalle_gastos: MovementDetail,
    /// One-off movements (incomes + expenses) realized in the window.
    pub num_extra: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<TrailingBenchmark>,
    pub notas: Vec<Note>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the budget-vs-actual summary for one user and month.
pub fn monthly_summary(
    input: &MonthlySummaryInput,
) -> PatrimonioResult<ComputationOutput<MonthlySummary>> {
    let start = Instant::now();
    let window = MonthWindow::new(input.anio, input.mes)?;

    let ingresos: Vec<&IncomeRecord> = input
        .ingresos
        .iter()
        .filter(|r| r.owner == input.user)
        .collect();
    let gastos: Vec<&ExpenseRecord> = input
        .gastos
        .iter()
        .filter(|r| r.owner == input.user)
        .collect();

    // Budget: active, kpi-flagged, recurring. One-off items never budget.
    let presupuesto = MonthlyBudget {
        ingresos: ingresos
            .iter()
            .filter(|r| r.activo && r.kpi && r.periodicidad.is_recurring())
            .map(|r| r.importe)
            .sum(),
        gastos_gestionables: gastos
            .iter()
            .filter(|r| {
                r.activo
                    && r.kpi
                    && r.periodicidad.is_recurring()
                    && r.segmento == Segment::Gestionable
            })
            .map(|r| r.importe)
            .sum(),
        gasto_cotidiano: gastos
            .iter()
            .filter(|r| {
                r.activo
                    && r.kpi
                    && r.periodicidad.is_recurring()
                    && r.segmento == Segment::Cotidiano
            })
            .map(|r| r.importe)
            .sum(),
    };

    // Actuals: realized inside the half-open window.
    let cobrados: Vec<&&IncomeRecord> = ingresos
        .iter()
        .filter(|r| r.cobrado && window.contains_opt(r.fecha_cobro))
        .collect();
    let pagados: Vec<&&ExpenseRecord> = gastos
        .iter()
        .filter(|r| r.pagado && window.contains_opt(r.fecha_pago))
        .collect();

    let detalle_ingresos = MovementDetail {
        recurrentes: cobrados
            .iter()
            .filter(|r| r.periodicidad.is_recurring())
            .map(|r| r.importe)
            .sum(),
        extraordinarios: cobrados
            .iter()
            .filter(|r| !r.periodicidad.is_recurring())
            .map(|r| r.importe)
            .sum(),
    };
    let detalle_gastos = MovementDetail {
        recurrentes: pagados
            .iter()
            .filter(|r| r.periodicidad.is_recurring())
            .map(|r| r.importe)
            .sum(),
        extraordinarios: pagados
            .iter()
            .filter(|r| !r.periodicidad.is_recurring())
            .map(|r| r.importe)
            .sum(),
    };

    let num_extra = cobrados
        .iter()
        .filter(|r| !r.periodicidad.is_recurring())
        .count() as u32
        + pagados
            .iter()
            .filter(|r| !r.periodicidad.is_recurring())
            .count() as u32;

    let ingresos_mes = detalle_ingresos.recurrentes + detalle_ingresos.extraordinarios;
    let gastos_mes = detalle_gastos.recurrentes + detalle_gastos.extraordinarios;
    let resultado_mes = ingresos_mes - gastos_mes;

    let cotidiano_real: Money = pagados
        .iter()
        .filter(|r| r.segmento == Segment::Cotidiano)
        .map(|r| r.importe)
        .sum();

    let benchmark = trailing_benchmark(
        &input.cierres,
        &input.user,
        &window,
        ingresos_mes,
        gastos_mes,
    );

    let notas = build_notes(&NoteContext {
        ingresos_mes,
        gastos_mes,
        resultado_mes,
        gastos_extraordinarios: detalle_gastos.extraordinarios,
        presupuesto_gastos: presupuesto.gastos_total(),
        presupuesto_cotidiano: presupuesto.gasto_cotidiano,
        cotidiano_real,
        desviacion_ingresos_pct: benchmark.as_ref().map(|b| b.desviacion_ingresos_pct),
        desviacion_gastos_pct: benchmark.as_ref().map(|b| b.desviacion_gastos_pct),
    });

    let summary = MonthlySummary {
        anio: input.anio,
        mes: input.mes,
        presupuesto,
        ingresos_mes,
        gastos_mes,
        resultado_mes,
        detalle_ingresos,
        detalle_gastos,
        num_extra,
        benchmark,
        notas,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly reconciliation (budget vs. actual, half-open month window)",
        input,
        Vec::new(),
        elapsed,
        summary,
    ))
}

/// Average the up-to-12 closings strictly preceding the target month.
/// Returns None when the user has no preceding closings at all.
fn trailing_benchmark(
    cierres: &[MonthlyClosing],
    user: &UserId,
    window: &MonthWindow,
    ingresos_mes: Money,
    gastos_mes: Money,
) -> Option<TrailingBenchmark> {
    let mut rows: Vec<&MonthlyClosing> = cierres
        .iter()
        .filter(|c| c.owner == *user && c.ordinal() < window.ordinal())
        .collect();
    rows.sort_by_key(|c| std::cmp::Reverse(c.ordinal()));
    rows.truncate(12);

    if rows.is_empty() {
        return None;
    }

    let n = Decimal::from(rows.len());
    let media_ingresos = rows.iter().map(|c| c.ingresos_reales).sum::<Decimal>() / n;
    let media_gastos = rows.iter().map(|c| c.gastos_reales).sum::<Decimal>() / n;
    let media_resultado = rows.iter().map(|c| c.resultado_real).sum::<Decimal>() / n;

    Some(TrailingBenchmark {
        meses: rows.len() as u32,
        media_ingresos,
        media_gastos,
        media_resultado,
        desviacion_ingresos_pct: pct_variation(media_ingresos, ingresos_mes),
        desviacion_gastos_pct: pct_variation(media_gastos, gastos_mes),
        run_rate_anual: media_resultado * dec!(12),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
