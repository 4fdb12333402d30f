//! Break-penalty estimate for ending a fixed term early: the greater of
//! three months' interest and the interest-rate differential (IRD).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentalFinanceError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, MAX_CONTRACT_RATE};
use crate::RentalResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakPenaltyInput {
    /// Outstanding balance at the break date.
    pub balance: Money,
    /// Contract rate on the existing term.
    pub contract_rate: Rate,
    /// Lender's comparison rate for the remaining term (posted or
    /// discounted, per the mortgage agreement).
    pub comparison_rate: Rate,
    /// Months left on the current term.
    pub months_remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakPenaltyOutput {
    pub three_months_interest: Money,
    pub interest_rate_differential: Money,
    /// max(three months' interest, IRD).
    pub penalty: Money,
}

/// Estimate the penalty for breaking the current term.
pub fn break_penalty(
    input: &BreakPenaltyInput,
) -> RentalResult<ComputationOutput<BreakPenaltyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.balance <= Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "balance".into(),
            reason: "Outstanding balance must be positive".into(),
        });
    }
    for (field, rate) in [
        ("contract_rate", input.contract_rate),
        ("comparison_rate", input.comparison_rate),
    ] {
        if rate < Decimal::ZERO || rate > MAX_CONTRACT_RATE {
            return Err(RentalFinanceError::InvalidInput {
                field: field.into(),
                reason: format!(
                    "Rate {rate} is outside the supported range [0, {MAX_CONTRACT_RATE}]"
                ),
            });
        }
    }

    let three_months_interest = input.balance * input.contract_rate * dec!(3) / dec!(12);

    let rate_differential = (input.contract_rate - input.comparison_rate).max(Decimal::ZERO);
    let interest_rate_differential =
        input.balance * rate_differential * Decimal::from(input.months_remaining) / dec!(12);

    let penalty = three_months_interest.max(interest_rate_differential);

    if rate_differential.is_zero() && input.contract_rate < input.comparison_rate {
        warnings.push(
            "Comparison rate exceeds the contract rate; the penalty falls back to three months' interest"
                .into(),
        );
    }

    let output = BreakPenaltyOutput {
        three_months_interest,
        interest_rate_differential,
        penalty,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mortgage Break Penalty (3 Months' Interest vs IRD)",
        input,
        warnings,
        elapsed,
        output,
    ))
}
