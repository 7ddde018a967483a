use clap::Args;
use serde_json::Value;

use patrimonio_core::balance::{self, BalanceInput};

use crate::input;

/// Arguments for balance by account
#[derive(Args)]
pub struct BalanceArgs {
    /// Path to JSON/YAML file with accounts, incomes and expenses
    #[arg(long)]
    pub input: Option<String>,

    /// Owner whose accounts are aggregated; overrides the input file
    #[arg(long)]
    pub user: Option<String>,

    /// Target year; overrides the input file
    #[arg(long)]
    pub anio: Option<i32>,

    /// Target month (1-12); overrides the input file
    #[arg(long)]
    pub mes: Option<u32>,
}

pub fn run_balance(args: BalanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut balance_input: BalanceInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file (or piped JSON) is required for balance".into());
    };

    if let Some(user) = args.user {
        balance_input.user = user;
    }
    if let Some(anio) = args.anio {
        balance_input.anio = anio;
    }
    if let Some(mes) = args.mes {
        balance_input.mes = mes;
    }

    let result = balance::balance_by_account(&balance_input)?;
    Ok(serde_json::to_value(result)?)
}
