mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::forecast::{BreakEvenArgs, ForecastArgs};
use commands::mortgage::{
    PaymentArgs, PenaltyArgs, PrepaymentArgs, RefinanceArgs, ScheduleArgs,
};

/// Rental property mortgage and investment analysis
#[derive(Parser)]
#[command(
    name = "rpa",
    version,
    about = "Rental property mortgage and investment analysis",
    long_about = "A CLI for rental property financing analysis with decimal precision. \
                  Supports mortgage payments, amortization schedules, prepayment and \
                  refinance scenarios, break penalties, ten-year investment forecasts, \
                  and break-even vacancy analysis."
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
    /// Calculate the fixed periodic mortgage payment
    Payment(PaymentArgs),
    /// Generate a full amortization schedule
    Schedule(ScheduleArgs),
    /// Compare a schedule against a lump-sum or increased-payment scenario
    Prepayment(PrepaymentArgs),
    /// Compare the current loan against a refinance on the same balance
    Refinance(RefinanceArgs),
    /// Estimate the mortgage break penalty (3 months' interest vs IRD)
    Penalty(PenaltyArgs),
    /// Run a ten-year rental investment forecast
    Forecast(ForecastArgs),
    /// Derive the break-even vacancy rate
    BreakEven(BreakEvenArgs),
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
        Commands::Payment(args) => commands::mortgage::run_payment(args),
        Commands::Schedule(args) => commands::mortgage::run_schedule(args),
        Commands::Prepayment(args) => commands::mortgage::run_prepayment(args),
        Commands::Refinance(args) => commands::mortgage::run_refinance(args),
        Commands::Penalty(args) => commands::mortgage::run_penalty(args),
        Commands::Forecast(args) => commands::forecast::run_forecast(args),
        Commands::BreakEven(args) => commands::forecast::run_break_even(args),
        Commands::Version => {
            println!("rpa {}", env!("CARGO_PKG_VERSION"));
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
