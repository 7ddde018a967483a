//! Rule-based narrative notes for the monthly summary.
//!
//! Each rule fires at most one note; notes are deduplicated by title and the
//! list is capped at [`MAX_NOTES`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{pct_variation, Money};

/// Maximum number of notes returned per summary.
pub const MAX_NOTES: usize = 6;

const BUDGET_OVERRUN_PCT: Decimal = dec!(10);
const EXPENSE_DEVIATION_PCT: Decimal = dec!(10);
const INCOME_DROP_PCT: Decimal = dec!(-15);
const INCOME_RISE_PCT: Decimal = dec!(10);
const EXTRAORDINARY_SHARE: Decimal = dec!(0.35);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteLevel {
    #[serde(rename = "INFO")]
    Info,
    #[serde(rename = "AVISO")]
    Aviso,
    #[serde(rename = "ALERTA")]
    Alerta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub titulo: String,
    pub nivel: NoteLevel,
    pub detalle: String,
}

/// Figures the rules evaluate; assembled by the monthly summary.
#[derive(Debug, Clone)]
pub(crate) struct NoteContext {
    pub ingresos_mes: Money,
    pub gastos_mes: Money,
    pub resultado_mes: Money,
    pub gastos_extraordinarios: Money,
    pub presupuesto_gastos: Money,
    pub presupuesto_cotidiano: Money,
    pub cotidiano_real: Money,
    pub desviacion_ingresos_pct: Option<Decimal>,
    pub desviacion_gastos_pct: Option<Decimal>,
}

pub(crate) fn build_notes(ctx: &NoteContext) -> Vec<Note> {
    let mut notes: Vec<Note> = Vec::new();

    if ctx.ingresos_mes.is_zero() && ctx.gastos_mes > Decimal::ZERO {
        notes.push(Note {
            titulo: "Mes sin ingresos".into(),
            nivel: NoteLevel::Alerta,
            detalle: format!(
                "No se ha cobrado ningún ingreso este mes y hay gastos por {}",
                ctx.gastos_mes
            ),
        });
    }

    if ctx.resultado_mes < Decimal::ZERO {
        notes.push(Note {
            titulo: "Mes en negativo".into(),
            nivel: NoteLevel::Alerta,
            detalle: format!("El resultado del mes es {}", ctx.resultado_mes),
        });
    }

    if let Some(dev) = ctx.desviacion_gastos_pct {
        if dev.abs() > EXPENSE_DEVIATION_PCT {
            let direccion = if dev > Decimal::ZERO { "encima" } else { "debajo" };
            notes.push(Note {
                titulo: "Gasto desviado de la media".into(),
                nivel: NoteLevel::Aviso,
                detalle: format!(
                    "El gasto del mes está un {dev}% por {direccion} de la media de los últimos 12 meses"
                ),
            });
        }
    }

    if let Some(dev) = ctx.desviacion_ingresos_pct {
        if dev < INCOME_DROP_PCT {
            notes.push(Note {
                titulo: "Ingresos por debajo de la media".into(),
                nivel: NoteLevel::Aviso,
                detalle: format!(
                    "Los ingresos del mes caen un {}% frente a la media de los últimos 12 meses",
                    dev.abs()
                ),
            });
        } else if dev > INCOME_RISE_PCT {
            notes.push(Note {
                titulo: "Ingresos por encima de la media".into(),
                nivel: NoteLevel::Info,
                detalle: format!(
                    "Los ingresos del mes superan en un {dev}% la media de los últimos 12 meses"
                ),
            });
        }
    }

    if ctx.gastos_mes > Decimal::ZERO
        && ctx.gastos_extraordinarios / ctx.gastos_mes >= EXTRAORDINARY_SHARE
    {
        notes.push(Note {
            titulo: "Peso elevado de gastos extraordinarios".into(),
            nivel: NoteLevel::Aviso,
            detalle: format!(
                "Los gastos extraordinarios ({}) suponen al menos el 35% del gasto del mes",
                ctx.gastos_extraordinarios
            ),
        });
    }

    if ctx.presupuesto_gastos > Decimal::ZERO {
        let overrun = pct_variation(ctx.presupuesto_gastos, ctx.gastos_mes);
        if overrun > BUDGET_OVERRUN_PCT {
            notes.push(Note {
                titulo: "Presupuesto de gasto superado".into(),
                nivel: NoteLevel::Aviso,
                detalle: format!(
                    "El gasto real supera el presupuesto mensual en un {overrun}%"
                ),
            });
        }
    }

    if ctx.presupuesto_cotidiano > Decimal::ZERO {
        let overrun = pct_variation(ctx.presupuesto_cotidiano, ctx.cotidiano_real);
        if overrun > BUDGET_OVERRUN_PCT {
            notes.push(Note {
                titulo: "Gasto cotidiano por encima de lo previsto".into(),
                nivel: NoteLevel::Aviso,
                detalle: format!(
                    "El gasto del día a día supera su presupuesto en un {overrun}%"
                ),
            });
        }
    }

    if ctx.ingresos_mes > Decimal::ZERO {
        let ratio = (ctx.gastos_mes / ctx.ingresos_mes * dec!(100)).round_dp(1);
        notes.push(Note {
            titulo: "Ratio gasto sobre ingresos".into(),
            nivel: NoteLevel::Info,
            detalle: format!("Este mes has gastado el {ratio}% de lo ingresado"),
        });
    }

    dedup_and_cap(notes)
}

fn dedup_and_cap(notes: Vec<Note>) -> Vec<Note> {
    let mut seen: Vec<String> = Vec::new();
    let mut out: Vec<Note> = Vec::new();
    for note in notes {
        if seen.contains(&note.titulo) {
            continue;
        }
        seen.push(note.titulo.clone());
        out.push(note);
        if out.len() == MAX_NOTES {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_month() -> NoteContext {
        NoteContext {
            ingresos_mes: dec!(2000),
            gastos_mes: dec!(1500),
            resultado_mes: dec!(500),
            gastos_extraordinarios: dec!(0),
            presupuesto_gastos: dec!(1600),
            presupuesto_cotidiano: dec!(400),
            cotidiano_real: dec!(350),
            desviacion_ingresos_pct: Some(dec!(1.0)),
            desviacion_gastos_pct: Some(dec!(-2.0)),
        }
    }

    fn titles(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.titulo.as_str()).collect()
    }

    #[test]
    fn test_quiet_month_only_ratio_insight() {
        let notes = build_notes(&quiet_month());
        assert_eq!(titles(&notes), vec!["Ratio gasto sobre ingresos"]);
        assert_eq!(notes[0].nivel, NoteLevel::Info);
    }

    #[test]
    fn test_zero_income_with_expenses_alerts() {
        let mut ctx = quiet_month();
        ctx.ingresos_mes = dec!(0);
        ctx.resultado_mes = dec!(-1500);
        let notes = build_notes(&ctx);
        assert!(titles(&notes).contains(&"Mes sin ingresos"));
        assert!(titles(&notes).contains(&"Mes en negativo"));
        // No income, so no ratio insight.
        assert!(!titles(&notes).contains(&"Ratio gasto sobre ingresos"));
    }

    #[test]
    fn test_expense_deviation_both_directions() {
        let mut ctx = quiet_month();
        ctx.desviacion_gastos_pct = Some(dec!(12));
        assert!(titles(&build_notes(&ctx)).contains(&"Gasto desviado de la media"));
        ctx.desviacion_gastos_pct = Some(dec!(-11));
        assert!(titles(&build_notes(&ctx)).contains(&"Gasto desviado de la media"));
        ctx.desviacion_gastos_pct = Some(dec!(9));
        assert!(!titles(&build_notes(&ctx)).contains(&"Gasto desviado de la media"));
    }

    #[test]
    fn test_income_deviation_thresholds() {
        let mut ctx = quiet_month();
        ctx.desviacion_ingresos_pct = Some(dec!(-16));
        assert!(titles(&build_notes(&ctx)).contains(&"Ingresos por debajo de la media"));
        ctx.desviacion_ingresos_pct = Some(dec!(11));
        assert!(titles(&build_notes(&ctx)).contains(&"Ingresos por encima de la media"));
        ctx.desviacion_ingresos_pct = Some(dec!(-10));
        let notes = build_notes(&ctx);
        assert!(!titles(&notes).contains(&"Ingresos por debajo de la media"));
        assert!(!titles(&notes).contains(&"Ingresos por encima de la media"));
    }

    #[test]
    fn test_extraordinary_share_threshold_inclusive() {
        let mut ctx = quiet_month();
        ctx.gastos_mes = dec!(1000);
        ctx.gastos_extraordinarios = dec!(350);
        assert!(
            titles(&build_notes(&ctx)).contains(&"Peso elevado de gastos extraordinarios")
        );
        ctx.gastos_extraordinarios = dec!(349);
        assert!(
            !titles(&build_notes(&ctx)).contains(&"Peso elevado de gastos extraordinarios")
        );
    }

    #[test]
    fn test_budget_and_daily_overruns() {
        let mut ctx = quiet_month();
        ctx.gastos_mes = dec!(1800); // vs 1600 budget: +12.5%
        ctx.cotidiano_real = dec!(450); // vs 400 budget: +12.5%
        let notes = build_notes(&ctx);
        assert!(titles(&notes).contains(&"Presupuesto de gasto superado"));
        assert!(titles(&notes).contains(&"Gasto cotidiano por encima de lo previsto"));
    }

    #[test]
    fn test_cap_at_max_notes() {
        // Trip every rule at once.
        let ctx = NoteContext {
            ingresos_mes: dec!(0),
            gastos_mes: dec!(2000),
            resultado_mes: dec!(-2000),
            gastos_extraordinarios: dec!(900),
            presupuesto_gastos: dec!(1000),
            presupuesto_cotidiano: dec!(100),
            cotidiano_real: dec!(300),
            desviacion_ingresos_pct: Some(dec!(-50)),
            desviacion_gastos_pct: Some(dec!(40)),
        };
        let notes = build_notes(&ctx);
        assert!(notes.len() <= MAX_NOTES);
    }

    #[test]
    fn test_no_benchmark_no_deviation_notes() {
        let mut ctx = quiet_month();
        ctx.desviacion_ingresos_pct = None;
        ctx.desviacion_gastos_pct = None;
        let notes = build_notes(&ctx);
        assert!(!titles(&notes).contains(&"Gasto desviado de la media"));
        assert!(!titles(&notes).contains(&"Ingresos por debajo de la media"));
    }
}
