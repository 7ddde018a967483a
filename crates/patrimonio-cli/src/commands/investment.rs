use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use patrimonio_core::investment::{self, InvestmentInput};

use crate::input;

/// Arguments for investment returns
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ReturnsArgs {
    /// Path to JSON/YAML file with dated cash flows
    #[arg(long)]
    pub input: Option<String>,

    /// Initial guess for the annual rate (0.1 = 10%)
    #[arg(long)]
    pub estimacion_inicial: Option<Decimal>,
}

pub fn run_returns(args: ReturnsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut returns_input: InvestmentInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file (or piped JSON) is required for returns".into());
    };

    if args.estimacion_inicial.is_some() {
        returns_input.estimacion_inicial = args.estimacion_inicial;
    }

    let result = investment::investment_returns(&returns_input)?;
    Ok(serde_json::to_value(result)?)
}
