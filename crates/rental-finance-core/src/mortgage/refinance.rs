//! Refinance comparison: the continuing loan against a new loan on the same
//! outstanding balance, expressed on a common monthly basis.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentalFinanceError;
use crate::mortgage::{payment, rates, PERIOD_CAP};
use crate::types::{
    with_metadata, Compounding, ComputationOutput, Money, PaymentFrequency, Rate,
};
use crate::RentalResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One side of the comparison: rate and structure applied to the shared
/// outstanding balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSnapshot {
    pub annual_rate: Rate,
    pub amortization_months: u32,
    pub frequency: PaymentFrequency,
    #[serde(default)]
    pub compounding: Compounding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceInput {
    /// Outstanding balance both loans are measured on.
    pub balance: Money,
    pub current: LoanSnapshot,
    pub proposed: LoanSnapshot,
    /// One-time cost of refinancing (penalty, legal, appraisal).
    pub refinance_cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceOutput {
    pub current_periodic_payment: Money,
    pub current_monthly_equivalent: Money,
    pub proposed_periodic_payment: Money,
    pub proposed_monthly_equivalent: Money,
    /// current minus proposed, monthly basis; positive = savings.
    pub payment_delta: Money,
    /// Interest on each side is summed over the shorter of the two
    /// amortizations so unequal durations are not compared.
    pub comparison_horizon_months: u32,
    pub lifetime_interest_delta: Money,
    /// Months for the payment savings to recoup the refinance cost.
    /// None when the proposed payment is no lower: refinancing never pays
    /// for itself.
    pub break_even_months: Option<u32>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare continuing the current loan against refinancing the same balance.
pub fn analyze_refinance(
    input: &RefinanceInput,
) -> RentalResult<ComputationOutput<RefinanceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.balance <= Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "balance".into(),
            reason: "Outstanding balance must be positive".into(),
        });
    }
    if input.refinance_cost < Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "refinance_cost".into(),
            reason: "Refinance cost cannot be negative".into(),
        });
    }

    let current = side(input.balance, &input.current)?;
    let proposed = side(input.balance, &input.proposed)?;

    let payment_delta = current.monthly_equivalent - proposed.monthly_equivalent;

    let horizon_months = input
        .current
        .amortization_months
        .min(input.proposed.amortization_months);
    let current_interest = interest_within(&current, horizon_months)?;
    let proposed_interest = interest_within(&proposed, horizon_months)?;
    let lifetime_interest_delta = current_interest - proposed_interest;

    let break_even_months = if payment_delta > Decimal::ZERO {
        let months = (input.refinance_cost / payment_delta).ceil();
        Some(months.to_u32().ok_or_else(|| RentalFinanceError::Computation {
            context: "break-even month count out of range".into(),
        })?)
    } else {
        warnings.push(
            "Proposed payment is not lower than the current payment; the refinance cost is never recouped"
                .into(),
        );
        None
    };

    let output = RefinanceOutput {
        current_periodic_payment: current.payment,
        current_monthly_equivalent: current.monthly_equivalent,
        proposed_periodic_payment: proposed.payment,
        proposed_monthly_equivalent: proposed.monthly_equivalent,
        payment_delta,
        comparison_horizon_months: horizon_months,
        lifetime_interest_delta,
        break_even_months,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Refinance Comparison (Monthly-Equivalent Basis)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Per-side computation
// ---------------------------------------------------------------------------

struct Side {
    payment: Money,
    monthly_equivalent: Money,
    periodic_rate: Rate,
    balance: Money,
    frequency: PaymentFrequency,
}

fn side(balance: Money, snapshot: &LoanSnapshot) -> RentalResult<Side> {
    let periodic_rate =
        rates::periodic_rate(snapshot.annual_rate, snapshot.frequency, snapshot.compounding)?;
    let pay = payment::payment_at_frequency(
        balance,
        snapshot.annual_rate,
        snapshot.frequency,
        snapshot.compounding,
        snapshot.amortization_months,
    )?;
    let ppy = Decimal::from(snapshot.frequency.payments_per_year());
    Ok(Side {
        payment: pay,
        monthly_equivalent: pay * ppy / dec!(12),
        periodic_rate,
        balance,
        frequency: snapshot.frequency,
    })
}

/// Interest accrued over the first `horizon_months` of the side's run-off.
fn interest_within(side: &Side, horizon_months: u32) -> RentalResult<Money> {
    let horizon_periods = rates::total_periods(horizon_months, side.frequency)?;
    let mut balance = side.balance;
    let mut total_interest = Decimal::ZERO;
    let mut periods = 0u32;

    while balance > Decimal::ZERO && periods < horizon_periods {
        periods += 1;
        if periods > PERIOD_CAP {
            return Err(RentalFinanceError::Computation {
                context: "refinance run-off failed to terminate within the period cap".into(),
            });
        }
        let interest = payment::round_cents(balance * side.periodic_rate);
        let principal = side.payment - interest;
        if principal <= Decimal::ZERO {
            return Err(RentalFinanceError::Computation {
                context: "payment does not cover accruing interest".into(),
            });
        }
        total_interest += interest;
        if principal >= balance {
            balance = Decimal::ZERO;
        } else {
            balance -= principal;
        }
    }

    Ok(total_interest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(rate: Decimal) -> LoanSnapshot {
        LoanSnapshot {
            annual_rate: rate,
            amortization_months: 240,
            frequency: PaymentFrequency::Monthly,
            compounding: Compounding::Nominal,
        }
    }

    fn input() -> RefinanceInput {
        RefinanceInput {
            balance: dec!(350000),
            current: snapshot(dec!(0.052)),
            proposed: snapshot(dec!(0.044)),
            refinance_cost: dec!(3000),
        }
    }

    #[test]
    fn test_refinance_scenario_350k() {
        // 350k over 20 years, 5.2% -> 4.4% nominal monthly: savings in the
        // 153-155/month range, 3000 cost recouped in ~20 months.
        let out = analyze_refinance(&input()).unwrap().result;
        assert!(
            out.payment_delta > dec!(153) && out.payment_delta < dec!(155),
            "delta {}",
            out.payment_delta
        );
        let be = out.break_even_months.unwrap();
        assert!((19..=21).contains(&be), "break-even {be}");
    }

    #[test]
    fn test_lower_rate_saves_lifetime_interest() {
        let out = analyze_refinance(&input()).unwrap().result;
        assert!(out.lifetime_interest_delta > Decimal::ZERO);
        assert_eq!(out.comparison_horizon_months, 240);
    }

    #[test]
    fn test_horizon_is_shorter_amortization() {
        let mut i = input();
        i.proposed.amortization_months = 120;
        let out = analyze_refinance(&i).unwrap().result;
        assert_eq!(out.comparison_horizon_months, 120);
    }

    #[test]
    fn test_higher_proposed_rate_never_breaks_even() {
        let mut i = input();
        i.proposed = snapshot(dec!(0.060));
        let out = analyze_refinance(&i).unwrap();
        assert!(out.result.break_even_months.is_none());
        assert!(out.result.payment_delta < Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_zero_cost_breaks_even_immediately() {
        let mut i = input();
        i.refinance_cost = Decimal::ZERO;
        let out = analyze_refinance(&i).unwrap().result;
        assert_eq!(out.break_even_months, Some(0));
    }

    #[test]
    fn test_cross_frequency_comparison_on_monthly_basis() {
        let mut i = input();
        i.proposed.frequency = PaymentFrequency::BiWeekly;
        let out = analyze_refinance(&i).unwrap().result;
        // Bi-weekly payment restated monthly: 26/12 periods per month.
        assert_eq!(
            out.proposed_monthly_equivalent,
            out.proposed_periodic_payment * dec!(26) / dec!(12)
        );
        assert!(out.payment_delta > Decimal::ZERO);
    }

    #[test]
    fn test_non_positive_balance_rejected() {
        let mut i = input();
        i.balance = Decimal::ZERO;
        assert!(analyze_refinance(&i).is_err());
    }

    #[test]
    fn test_out_of_range_rate_rejected() {
        let mut i = input();
        i.proposed.annual_rate = dec!(0.55);
        assert!(analyze_refinance(&i).is_err());
    }

    #[test]
    fn test_negative_cost_rejected() {
        let mut i = input();
        i.refinance_cost = dec!(-1);
        assert!(analyze_refinance(&i).is_err());
    }
}
