use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use patrimonio_core::analytics::day_to_day::{self, DayToDayInput};
use patrimonio_core::analytics::trend;

use crate::input;

/// Arguments for day-to-day spend analytics
#[derive(Args)]
pub struct DayToDayArgs {
    /// Path to JSON/YAML file with expense records
    #[arg(long)]
    pub input: Option<String>,

    /// Owner whose spend is analysed; overrides the input file
    #[arg(long)]
    pub user: Option<String>,

    /// Target year; overrides the input file
    #[arg(long)]
    pub anio: Option<i32>,

    /// Target month (1-12); overrides the input file
    #[arg(long)]
    pub mes: Option<u32>,

    /// Cut-off date for the daily average (YYYY-MM-DD)
    #[arg(long)]
    pub hasta: Option<NaiveDate>,
}

/// Arguments for trend classification
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct TrendArgs {
    /// Path to JSON/YAML file with a "serie" array, oldest first
    #[arg(long)]
    pub input: Option<String>,

    /// Inline series, comma-separated, oldest first (e.g. "100,120,130")
    #[arg(long)]
    pub serie: Option<String>,
}

pub fn run_day_to_day(args: DayToDayArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut dtd_input: DayToDayInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file (or piped JSON) is required for day-to-day".into());
    };

    if let Some(user) = args.user {
        dtd_input.user = user;
    }
    if let Some(anio) = args.anio {
        dtd_input.anio = anio;
    }
    if let Some(mes) = args.mes {
        dtd_input.mes = mes;
    }
    if args.hasta.is_some() {
        dtd_input.hasta = args.hasta;
    }

    let result = day_to_day::day_to_day(&dtd_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_trend(args: TrendArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series: Vec<Decimal> = if let Some(ref raw) = args.serie {
        raw.split(',')
            .map(|s| s.trim().parse::<Decimal>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("Invalid --serie value: {}", e))?
    } else if let Some(ref path) = args.input {
        let wrapper: TrendFile = input::file::read_input(path)?;
        wrapper.serie
    } else if let Some(data) = input::stdin::read_stdin()? {
        let wrapper: TrendFile = serde_json::from_value(data)?;
        wrapper.serie
    } else {
        return Err("--serie or --input is required for trend classification".into());
    };

    let result = trend::classify_trend(&series)?;
    Ok(serde_json::to_value(result)?)
}

#[derive(serde::Deserialize)]
struct TrendFile {
    serie: Vec<Decimal>,
}
