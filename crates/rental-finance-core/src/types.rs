use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RentalFinanceError;
use crate::RentalResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.0269 = 2.69%). Never as percentages.
pub type Rate = Decimal;

/// Upper bound on any contract rate the engine will accept.
pub const MAX_CONTRACT_RATE: Decimal = dec!(0.5);

/// Longest supported amortization, in months (50 years).
pub const MAX_AMORTIZATION_MONTHS: u32 = 600;

/// Fixed vs. variable pricing of a mortgage rate.
///
/// A variable loan is quoted as a reference rate plus a signed spread; the
/// engine amortizes at the combined contract rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RateKind {
    Fixed,
    Variable { spread: Rate },
}

impl Default for RateKind {
    fn default() -> Self {
        RateKind::Fixed
    }
}

/// How the quoted annual rate converts to a per-period rate.
///
/// `SemiAnnual` is the Canadian mortgage convention: the nominal rate
/// compounds semi-annually regardless of payment frequency, so the periodic
/// rate for N periods/year is (1 + r/2)^(2/N) - 1. `Nominal` is the simple
/// r/N division used by quick estimators and US-style quotes. The convention
/// is a field of the loan, so one schedule can never mix the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compounding {
    SemiAnnual,
    Nominal,
}

impl Default for Compounding {
    fn default() -> Self {
        Compounding::SemiAnnual
    }
}

/// Payment frequency and its payment-amount convention.
///
/// Straight frequencies solve their own payment at their own periodic rate.
/// Accelerated frequencies pay the *monthly* payment divided by 2 (bi-weekly)
/// or 4 (weekly), which overpays relative to the solved amount and shortens
/// the amortization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Monthly,
    SemiMonthly,
    BiWeekly,
    AcceleratedBiWeekly,
    Weekly,
    AcceleratedWeekly,
}

impl PaymentFrequency {
    pub fn payments_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::SemiMonthly => 24,
            PaymentFrequency::BiWeekly | PaymentFrequency::AcceleratedBiWeekly => 26,
            PaymentFrequency::Weekly | PaymentFrequency::AcceleratedWeekly => 52,
        }
    }

    /// True when the payment amount derives from the monthly payment rather
    /// than being solved at this frequency.
    pub fn is_accelerated(&self) -> bool {
        matches!(
            self,
            PaymentFrequency::AcceleratedBiWeekly | PaymentFrequency::AcceleratedWeekly
        )
    }

    /// Divisor applied to the monthly payment for accelerated frequencies.
    pub fn accelerated_divisor(&self) -> Option<Decimal> {
        match self {
            PaymentFrequency::AcceleratedBiWeekly => Some(dec!(2)),
            PaymentFrequency::AcceleratedWeekly => Some(dec!(4)),
            _ => None,
        }
    }
}

/// Immutable description of a mortgage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Original loan amount.
    pub principal: Money,
    /// Quoted annual rate (reference rate for variable loans).
    pub annual_rate: Rate,
    pub rate_kind: RateKind,
    pub compounding: Compounding,
    /// Full amortization period in months (1..=600).
    pub amortization_months: u32,
    /// Contract term in months (<= amortization). Renewal bookkeeping only;
    /// the payment is always solved over the full amortization.
    pub term_months: u32,
    pub frequency: PaymentFrequency,
    /// Date the loan was advanced. The first payment falls one period later.
    pub start_date: NaiveDate,
}

impl LoanTerms {
    /// Effective annual contract rate: quoted rate plus the variable spread.
    pub fn contract_rate(&self) -> Rate {
        match &self.rate_kind {
            RateKind::Fixed => self.annual_rate,
            RateKind::Variable { spread } => self.annual_rate + *spread,
        }
    }

    pub fn validate(&self) -> RentalResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(RentalFinanceError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        let rate = self.contract_rate();
        if rate < Decimal::ZERO || rate > MAX_CONTRACT_RATE {
            return Err(RentalFinanceError::InvalidInput {
                field: "annual_rate".into(),
                reason: format!(
                    "Contract rate {rate} is outside the supported range [0, {MAX_CONTRACT_RATE}]"
                ),
            });
        }
        if self.amortization_months == 0 || self.amortization_months > MAX_AMORTIZATION_MONTHS {
            return Err(RentalFinanceError::InvalidInput {
                field: "amortization_months".into(),
                reason: format!(
                    "Amortization must be between 1 and {MAX_AMORTIZATION_MONTHS} months"
                ),
            });
        }
        if self.term_months == 0 || self.term_months > self.amortization_months {
            return Err(RentalFinanceError::InvalidInput {
                field: "term_months".into(),
                reason: "Term must be between 1 month and the amortization period".into(),
            });
        }
        Ok(())
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
