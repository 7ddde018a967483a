//! Day-to-day (COTIDIANO) spend analytics for one user and month: totals,
//! daily average, end-of-month projection, and trend over trailing months.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::records::ExpenseRecord;
use crate::reconciliation::window::MonthWindow;
use crate::types::{pct_variation, with_metadata, ComputationOutput, Money, Segment, UserId};
use crate::PatrimonioResult;

use super::trend::{classify_trend, Trend};

/// Months of history (before the target) included in the trend series.
const TREND_HISTORY_MONTHS: usize = 6;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayToDayInput {
    pub user: UserId,
    pub anio: i32,
    pub mes: u32,
    /// Cut-off for the daily average; defaults to the end of the month and is
    /// clamped into the window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hasta: Option<NaiveDate>,
    pub gastos: Vec<ExpenseRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    pub anio: i32,
    pub mes: u32,
    pub total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayToDayOutput {
    pub total_mes: Money,
    pub dias_transcurridos: i64,
    pub media_diaria: Money,
    /// Daily average extrapolated to the full month.
    pub proyeccion_mes: Money,
    pub variacion_vs_mes_anterior_pct: Decimal,
    pub tendencia: Trend,
    /// Trailing monthly totals, oldest first, target month last.
    pub serie_mensual: Vec<MonthTotal>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Analyze daily spend for one user and month.
pub fn day_to_day(input: &DayToDayInput) -> PatrimonioResult<ComputationOutput<DayToDayOutput>> {
    let start = Instant::now();
    let window = MonthWindow::new(input.anio, input.mes)?;

    let gastos: Vec<&ExpenseRecord> = input
        .gastos
        .iter()
        .filter(|r| r.owner == input.user && r.segmento == Segment::Cotidiano && r.pagado)
        .collect();

    let last_day = window.end - Duration::days(1);
    let hasta = input
        .hasta
        .unwrap_or(last_day)
        .clamp(window.start, last_day);
    let dias_transcurridos = (hasta - window.start).num_days() + 1;

    let total_mes: Money = gastos
        .iter()
        .filter(|r| window.contains_opt(r.fecha_pago))
        .map(|r| r.importe)
        .sum();

    // dias_transcurridos >= 1 by construction.
    let media_diaria = (total_mes / Decimal::from(dias_transcurridos)).round_dp(2);
    let proyeccion_mes = (media_diaria * Decimal::from(window.days_in_month())).round_dp(2);

    // Trailing monthly totals, oldest first, ending on the target month.
    let mut windows = vec![window];
    let mut cursor = window;
    for _ in 0..TREND_HISTORY_MONTHS {
        cursor = cursor.pred()?;
        windows.push(cursor);
    }
    windows.reverse();

    let serie_mensual: Vec<MonthTotal> = windows
        .iter()
        .map(|w| MonthTotal {
            anio: w.year(),
            mes: w.month(),
            total: gastos
                .iter()
                .filter(|r| w.contains_opt(r.fecha_pago))
                .map(|r| r.importe)
                .sum(),
        })
        .collect();

    let series: Vec<Money> = serie_mensual.iter().map(|m| m.total).collect();
    let tendencia = classify_trend(&series)?.tendencia;
    let prev_total = serie_mensual[serie_mensual.len() - 2].total;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Day-to-day spend run rate and trend",
        input,
        Vec::new(),
        elapsed,
        DayToDayOutput {
            total_mes,
            dias_transcurridos,
            media_diaria,
            proyeccion_mes,
            variacion_vs_mes_anterior_pct: pct_variation(prev_total, total_mes),
            tendencia,
            serie_mensual,
        },
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
