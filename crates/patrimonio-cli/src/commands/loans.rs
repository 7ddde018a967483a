use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use patrimonio_core::amortization::prepayment::{self, PrepaymentInput};
use patrimonio_core::amortization::schedule::{self, LoanInput};

use crate::input;

/// Arguments for schedule generation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AmortizeArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate as a percentage (3.5 = 3.5%)
    #[arg(long, alias = "tin")]
    pub tasa_anual: Option<Decimal>,

    /// Number of installments
    #[arg(long)]
    pub plazo: Option<u32>,

    /// Payment periodicity (MENSUAL, TRIMESTRAL, SEMESTRAL, ANUAL)
    #[arg(long, default_value = "mensual")]
    pub periodicidad: String,

    /// Contract date; installments fall due one period later (YYYY-MM-DD)
    #[arg(long)]
    pub fecha_inicio: Option<NaiveDate>,

    /// Loan kind (HIPOTECA, PERSONAL)
    #[arg(long, default_value = "hipoteca")]
    pub tipo: String,
}

/// Arguments for prepayment recalculation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PrepayArgs {
    /// Path to JSON/YAML file with the current schedule and terms
    #[arg(long)]
    pub input: Option<String>,

    /// Prepayment amount; overrides the one in the input file
    #[arg(long)]
    pub importe: Option<Decimal>,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: LoanInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        LoanInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            tasa_anual_pct: args
                .tasa_anual
                .ok_or("--tasa-anual is required (or provide --input)")?,
            plazo: args.plazo.ok_or("--plazo is required (or provide --input)")?,
            periodicidad: super::parse_token(&args.periodicidad)?,
            fecha_inicio: args
                .fecha_inicio
                .ok_or("--fecha-inicio is required (or provide --input)")?,
            tipo: super::parse_token(&args.tipo)?,
        }
    };

    let result = schedule::generate_schedule(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_prepay(args: PrepayArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut prepay_input: PrepaymentInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file (or piped JSON) is required for prepayment".into());
    };

    if let Some(importe) = args.importe {
        prepay_input.importe = importe;
    }

    let result = prepayment::recalculate_with_prepayment(&prepay_input)?;
    Ok(serde_json::to_value(result)?)
}
