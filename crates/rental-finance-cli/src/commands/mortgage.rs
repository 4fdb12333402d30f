use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rental_finance_core::mortgage::payment::{self, PaymentInput};
use rental_finance_core::mortgage::penalty::{self, BreakPenaltyInput};
use rental_finance_core::mortgage::prepayment::{self, PrepaymentInput};
use rental_finance_core::mortgage::refinance::{self, LoanSnapshot, RefinanceInput};
use rental_finance_core::mortgage::schedule::{self, ScheduleInput};
use rental_finance_core::types::RateKind;

use crate::commands::{parse_compounding, parse_frequency};
use crate::input;

/// Arguments for payment calculation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PaymentArgs {
    /// Purchase price of the property
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Down payment amount
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Quoted annual rate (e.g. 0.055 for 5.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Spread over the reference rate for a variable loan
    #[arg(long)]
    pub variable_spread: Option<Decimal>,

    /// Amortization in months
    #[arg(long)]
    pub amortization_months: Option<u32>,

    /// Payment frequency (monthly, semi-monthly, bi-weekly,
    /// accelerated-bi-weekly, weekly, accelerated-weekly)
    #[arg(long, default_value = "monthly")]
    pub frequency: String,

    /// Rate compounding convention (semi-annual or nominal)
    #[arg(long, default_value = "semi-annual")]
    pub compounding: String,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file with the loan terms
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for prepayment analysis
#[derive(Args)]
pub struct PrepaymentArgs {
    /// Path to JSON/YAML input file with loan terms and the intervention
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for refinance comparison
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RefinanceArgs {
    /// Outstanding balance being refinanced
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Annual rate on the continuing loan
    #[arg(long)]
    pub current_rate: Option<Decimal>,

    /// Annual rate on the proposed loan
    #[arg(long)]
    pub new_rate: Option<Decimal>,

    /// Remaining amortization in months (applied to both sides)
    #[arg(long)]
    pub amortization_months: Option<u32>,

    /// Payment frequency for both sides
    #[arg(long, default_value = "monthly")]
    pub frequency: String,

    /// Rate compounding convention for both sides (semi-annual or nominal)
    #[arg(long, default_value = "semi-annual")]
    pub compounding: String,

    /// One-time cost of refinancing (penalty, legal, appraisal)
    #[arg(long, default_value = "0")]
    pub refinance_cost: Decimal,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for break penalty estimation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PenaltyArgs {
    /// Outstanding balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Contract rate on the existing loan
    #[arg(long)]
    pub contract_rate: Option<Decimal>,

    /// Lender's comparison rate for the remaining term
    #[arg(long)]
    pub comparison_rate: Option<Decimal>,

    /// Months remaining in the current term
    #[arg(long)]
    pub months_remaining: Option<u32>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment_input: PaymentInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        PaymentInput {
            purchase_price: args
                .purchase_price
                .ok_or("--purchase-price is required (or provide --input)")?,
            down_payment: args
                .down_payment
                .ok_or("--down-payment is required (or provide --input)")?,
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            rate_kind: match args.variable_spread {
                Some(spread) => RateKind::Variable { spread },
                None => RateKind::Fixed,
            },
            compounding: parse_compounding(&args.compounding)?,
            amortization_months: args
                .amortization_months
                .ok_or("--amortization-months is required (or provide --input)")?,
            frequency: parse_frequency(&args.frequency)?,
        }
    };
    let result = payment::calculate_payment(&payment_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file> or stdin required for schedule generation".into());
    };
    let result = schedule::generate_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_prepayment(args: PrepaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pp_input: PrepaymentInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file> or stdin required for prepayment analysis".into());
    };
    let result = prepayment::analyze_prepayment(&pp_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_refinance(args: RefinanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let refi_input: RefinanceInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let amortization_months = args
            .amortization_months
            .ok_or("--amortization-months is required (or provide --input)")?;
        let frequency = parse_frequency(&args.frequency)?;
        let compounding = parse_compounding(&args.compounding)?;
        RefinanceInput {
            balance: args
                .balance
                .ok_or("--balance is required (or provide --input)")?,
            current: LoanSnapshot {
                annual_rate: args
                    .current_rate
                    .ok_or("--current-rate is required (or provide --input)")?,
                amortization_months,
                frequency,
                compounding,
            },
            proposed: LoanSnapshot {
                annual_rate: args
                    .new_rate
                    .ok_or("--new-rate is required (or provide --input)")?,
                amortization_months,
                frequency,
                compounding,
            },
            refinance_cost: args.refinance_cost,
        }
    };
    let result = refinance::analyze_refinance(&refi_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_penalty(args: PenaltyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let penalty_input: BreakPenaltyInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        BreakPenaltyInput {
            balance: args
                .balance
                .ok_or("--balance is required (or provide --input)")?,
            contract_rate: args
                .contract_rate
                .ok_or("--contract-rate is required (or provide --input)")?,
            comparison_rate: args
                .comparison_rate
                .ok_or("--comparison-rate is required (or provide --input)")?,
            months_remaining: args
                .months_remaining
                .ok_or("--months-remaining is required (or provide --input)")?,
        }
    };
    let result = penalty::break_penalty(&penalty_input)?;
    Ok(serde_json::to_value(result)?)
}
