mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analytics::{DayToDayArgs, TrendArgs};
use commands::balance::BalanceArgs;
use commands::investment::ReturnsArgs;
use commands::loans::{AmortizeArgs, PrepayArgs};
use commands::reconciliation::MonthlySummaryArgs;

/// Household finance calculations with decimal precision
#[derive(Parser)]
#[command(
    name = "pfa",
    version,
    about = "Household finance calculations with decimal precision",
    long_about = "A CLI for the computational core of a household finance tracker. \
                  Supports French amortization schedules, prepayment recalculation, \
                  monthly budget-vs-actual closes, balance by account, day-to-day \
                  spend analytics, and money-weighted investment returns."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a French amortization schedule for a loan
    Amortize(AmortizeArgs),
    /// Recalculate a schedule after a partial prepayment (shorten term)
    Prepay(PrepayArgs),
    /// Monthly budget-vs-actual close with automatic notes
    MonthlySummary(MonthlySummaryArgs),
    /// Balance and liquidity by account for one month
    Balance(BalanceArgs),
    /// Day-to-day spend run rate, projection and trend
    DayToDay(DayToDayArgs),
    /// Classify a monthly series as UP, DOWN or FLAT
    Trend(TrendArgs),
    /// Money-weighted investment returns (XIRR, MOIC)
    Returns(ReturnsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::loans::run_amortize(args),
        Commands::Prepay(args) => commands::loans::run_prepay(args),
        Commands::MonthlySummary(args) => commands::reconciliation::run_monthly_summary(args),
        Commands::Balance(args) => commands::balance::run_balance(args),
        Commands::DayToDay(args) => commands::analytics::run_day_to_day(args),
        Commands::Trend(args) => commands::analytics::run_trend(args),
        Commands::Returns(args) => commands::investment::run_returns(args),
        Commands::Version => {
            println!("pfa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
