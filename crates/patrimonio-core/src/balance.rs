//! Per-account balance aggregation and global liquidity KPIs.
//!
//! The closing balance is the account's stored live balance, never derived
//! from the month's movements: transfers and manual adjustments mutate it
//! outside the movement records, and a derived figure would silently diverge.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::records::{AccountRecord, ExpenseRecord, IncomeRecord};
use crate::reconciliation::window::MonthWindow;
use crate::types::{with_metadata, ComputationOutput, Money, Segment, UserId};
use crate::PatrimonioResult;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceInput {
    pub user: UserId,
    pub anio: i32,
    pub mes: u32,
    pub cuentas: Vec<AccountRecord>,
    pub ingresos: Vec<IncomeRecord>,
    pub gastos: Vec<ExpenseRecord>,
}

/// One active account's monthly movement picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub cuenta: String,
    pub nombre: String,
    /// Opening-of-month snapshot.
    pub saldo_inicial: Money,
    /// Collected incomes in the window.
    pub entradas: Money,
    pub salidas_gestionables: Money,
    pub salidas_cotidianas: Money,
    /// Combined outflows.
    pub salidas: Money,
    /// Stored live balance (source of truth, not derived).
    pub saldo_actual: Money,
    /// Active income not yet collected.
    pub pendiente_ingresos: Money,
    /// Active manageable expense not yet paid.
    pub pendiente_gestionable: Money,
    /// Active daily-spend expense not yet paid.
    pub pendiente_cotidiano: Money,
    /// `saldo_actual − pending expenses + pending income`.
    pub liquidez_proyectada: Money,
}

/// Global liquidity KPIs across all active accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityKpis {
    pub liquidez_actual: Money,
    pub liquidez_inicial: Money,
    pub pendiente_ingresos: Money,
    pub pendiente_gastos: Money,
    pub liquidez_proyectada: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceOutput {
    pub cuentas: Vec<AccountBalance>,
    pub kpis: LiquidityKpis,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute per-account movements and pending figures for one user and month,
/// plus the global liquidity KPIs.
pub fn balance_by_account(
    input: &BalanceInput,
) -> PatrimonioResult<ComputationOutput<BalanceOutput>> {
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

    let mut cuentas: Vec<AccountBalance> = Vec::new();
    for account in input
        .cuentas
        .iter()
        .filter(|a| a.owner == input.user && a.activo)
    {
        let entradas: Money = ingresos
            .iter()
            .filter(|r| r.cuenta == account.id && r.cobrado && window.contains_opt(r.fecha_cobro))
            .map(|r| r.importe)
            .sum();

        let paid_in_month = |segmento: Segment| -> Money {
            gastos
                .iter()
                .filter(|r| {
                    r.cuenta == account.id
                        && r.segmento == segmento
                        && r.pagado
                        && window.contains_opt(r.fecha_pago)
                })
                .map(|r| r.importe)
                .sum()
        };
        let salidas_gestionables = paid_in_month(Segment::Gestionable);
        let salidas_cotidianas = paid_in_month(Segment::Cotidiano);

        let pendiente_ingresos: Money = ingresos
            .iter()
            .filter(|r| r.cuenta == account.id && r.activo && !r.cobrado)
            .map(|r| r.importe)
            .sum();
        let pending = |segmento: Segment| -> Money {
            gastos
                .iter()
                .filter(|r| {
                    r.cuenta == account.id && r.segmento == segmento && r.activo && !r.pagado
                })
                .map(|r| r.importe)
                .sum()
        };
        let pendiente_gestionable = pending(Segment::Gestionable);
        let pendiente_cotidiano = pending(Segment::Cotidiano);

        cuentas.push(AccountBalance {
            cuenta: account.id.clone(),
            nombre: account.nombre.clone(),
            saldo_inicial: account.saldo_inicio_mes,
            entradas,
            salidas_gestionables,
            salidas_cotidianas,
            salidas: salidas_gestionables + salidas_cotidianas,
            saldo_actual: account.saldo_actual,
            pendiente_ingresos,
            pendiente_gestionable,
            pendiente_cotidiano,
            liquidez_proyectada: account.saldo_actual
                - (pendiente_gestionable + pendiente_cotidiano)
                + pendiente_ingresos,
        });
    }

    let kpis = LiquidityKpis {
        liquidez_actual: cuentas.iter().map(|c| c.saldo_actual).sum(),
        liquidez_inicial: cuentas.iter().map(|c| c.saldo_inicial).sum(),
        pendiente_ingresos: cuentas.iter().map(|c| c.pendiente_ingresos).sum(),
        pendiente_gastos: cuentas
            .iter()
            .map(|c| c.pendiente_gestionable + c.pendiente_cotidiano)
            .sum(),
        liquidez_proyectada: cuentas.iter().map(|c| c.liquidez_proyectada).sum(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Balance by account (stored closing balance, half-open month window)",
        input,
        Vec::new(),
        elapsed,
        BalanceOutput { cuentas, kpis },
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Periodicity;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account(owner: &str, id: &str, inicial: rust_decimal::Decimal, actual: rust_decimal::Decimal) -> AccountRecord {
        AccountRecord {
            owner: owner.into(),
            id: id.into(),
            nombre: format!("Cuenta {id}"),
            activo: true,
            saldo_inicio_mes: inicial,
            saldo_actual: actual,
        }
    }

    fn base_input() -> BalanceInput {
        BalanceInput {
            user: "u1".into(),
            anio: 2025,
            mes: 3,
            cuentas: vec![account("u1", "acc-1", dec!(1000), dec!(1450))],
            ingresos: vec![
                IncomeRecord {
                    owner: "u1".into(),
                    concepto: "nomina".into(),
                    cuenta: "acc-1".into(),
                    importe: dec!(2000),
                    periodicidad: Periodicity::Mensual,
                    activo: true,
                    kpi: true,
                    cobrado: true,
                    fecha_cobro: Some(day(2025, 3, 1)),
                },
                IncomeRecord {
                    owner: "u1".into(),
                    concepto: "alquiler".into(),
                    cuenta: "acc-1".into(),
                    importe: dec!(600),
                    periodicidad: Periodicity::Mensual,
                    activo: true,
                    kpi: true,
                    cobrado: false,
                    fecha_cobro: None,
                },
            ],
            gastos: vec![
                ExpenseRecord {
                    owner: "u1".into(),
                    concepto: "hipoteca".into(),
                    cuenta: "acc-1".into(),
                    importe: dec!(700),
                    periodicidad: Periodicity::Mensual,
                    segmento: Segment::Gestionable,
                    activo: true,
                    kpi: true,
                    pagado: true,
                    fecha_pago: Some(day(2025, 3, 2)),
                },
                ExpenseRecord {
                    owner: "u1".into(),
                    concepto: "compra".into(),
                    cuenta: "acc-1".into(),
                    importe: dec!(250),
                    periodicidad: Periodicity::Mensual,
                    segmento: Segment::Cotidiano,
                    activo: true,
                    kpi: true,
                    pagado: true,
                    fecha_pago: Some(day(2025, 3, 12)),
                },
                ExpenseRecord {
                    owner: "u1".into(),
                    concepto: "seguro".into(),
                    cuenta: "acc-1".into(),
                    importe: dec!(300),
                    periodicidad: Periodicity::Mensual,
                    segmento: Segment::Gestionable,
                    activo: true,
                    kpi: true,
                    pagado: false,
                    fecha_pago: None,
                },
            ],
        }
    }

    fn run(input: &BalanceInput) -> BalanceOutput {
        balance_by_account(input).unwrap().result
    }

    #[test]
    fn test_movements_and_pending_split() {
        let out = run(&base_input());
        assert_eq!(out.cuentas.len(), 1);
        let c = &out.cuentas[0];
        assert_eq!(c.entradas, dec!(2000));
        assert_eq!(c.salidas_gestionables, dec!(700));
        assert_eq!(c.salidas_cotidianas, dec!(250));
        assert_eq!(c.salidas, dec!(950));
        assert_eq!(c.pendiente_ingresos, dec!(600));
        assert_eq!(c.pendiente_gestionable, dec!(300));
        assert_eq!(c.pendiente_cotidiano, dec!(0));
    }

    #[test]
    fn test_closing_balance_is_stored_not_derived() {
        let mut input = base_input();
        // Live balance deliberately inconsistent with opening + movements
        // (a transfer happened outside the movement records).
        input.cuentas[0].saldo_actual = dec!(5000);
        let out = run(&input);
        assert_eq!(out.cuentas[0].saldo_actual, dec!(5000));
    }

    #[test]
    fn test_projected_liquidity() {
        let out = run(&base_input());
        let c = &out.cuentas[0];
        // 1450 - (300 + 0) + 600 = 1750
        assert_eq!(c.liquidez_proyectada, dec!(1750));
        assert_eq!(out.kpis.liquidez_proyectada, dec!(1750));
    }

    #[test]
    fn test_inactive_accounts_excluded() {
        let mut input = base_input();
        input.cuentas.push(AccountRecord {
            activo: false,
            ..account("u1", "acc-2", dec!(9999), dec!(9999))
        });
        let out = run(&input);
        assert_eq!(out.cuentas.len(), 1);
        assert_eq!(out.kpis.liquidez_actual, dec!(1450));
    }

    #[test]
    fn test_cross_tenant_accounts_invisible() {
        let mut input = base_input();
        input.cuentas.push(account("u2", "acc-9", dec!(7777), dec!(7777)));
        input.ingresos.push(IncomeRecord {
            owner: "u2".into(),
            concepto: "ajeno".into(),
            cuenta: "acc-1".into(),
            importe: dec!(123),
            periodicidad: Periodicity::Mensual,
            activo: true,
            kpi: true,
            cobrado: true,
            fecha_cobro: Some(day(2025, 3, 3)),
        });
        let out = run(&input);
        assert_eq!(out.cuentas.len(), 1);
        assert_eq!(out.cuentas[0].entradas, dec!(2000));
    }

    #[test]
    fn test_payment_outside_window_not_an_outflow() {
        let mut input = base_input();
        input.gastos[0].fecha_pago = Some(day(2025, 4, 1));
        let out = run(&input);
        assert_eq!(out.cuentas[0].salidas_gestionables, dec!(0));
    }

    #[test]
    fn test_kpi_totals_across_accounts() {
        let mut input = base_input();
        input.cuentas.push(account("u1", "acc-2", dec!(500), dec!(800)));
        let out = run(&input);
        assert_eq!(out.kpis.liquidez_actual, dec!(2250));
        assert_eq!(out.kpis.liquidez_inicial, dec!(1500));
    }
}
