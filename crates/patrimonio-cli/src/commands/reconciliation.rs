use clap::Args;
use serde_json::Value;

use patrimonio_core::reconciliation::monthly::{self, MonthlySummaryInput};

use crate::input;

/// Arguments for the monthly close
#[derive(Args)]
pub struct MonthlySummaryArgs {
    /// Path to JSON/YAML file with incomes, expenses and past closes
    #[arg(long)]
    pub input: Option<String>,

    /// Owner whose records are summarised; overrides the input file
    #[arg(long)]
    pub user: Option<String>,

    /// Target year; overrides the input file
    #[arg(long)]
    pub anio: Option<i32>,

    /// Target month (1-12); overrides the input file
    #[arg(long)]
    pub mes: Option<u32>,
}

pub fn run_monthly_summary(args: MonthlySummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut summary_input: MonthlySummaryInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file (or piped JSON) is required for the monthly close".into());
    };

    if let Some(user) = args.user {
        summary_input.user = user;
    }
    if let Some(anio) = args.anio {
        summary_input.anio = anio;
    }
    if let Some(mes) = args.mes {
        summary_input.mes = mes;
    }

    let result = monthly::monthly_summary(&summary_input)?;
    Ok(serde_json::to_value(result)?)
}
