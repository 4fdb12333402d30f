//! Prepayment scenarios: one-time lump sum or a permanently increased
//! payment, re-simulated against the baseline schedule.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentalFinanceError;
use crate::mortgage::schedule::{self, DateStepper, Schedule};
use crate::mortgage::{payment, rates};
use crate::types::{with_metadata, ComputationOutput, LoanTerms, Money};
use crate::RentalResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The intervention applied to the baseline schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Intervention {
    /// One-time principal reduction applied with the given payment. The
    /// original payment amount is kept, so the tail shortens instead of the
    /// payment shrinking.
    LumpSum {
        amount: Money,
        applied_at_payment: u32,
    },
    /// Every payment from the given number onward is raised by the extra
    /// amount, all of which goes to principal.
    PermanentIncrease {
        extra_per_payment: Money,
        effective_from_payment: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentInput {
    pub terms: LoanTerms,
    pub intervention: Intervention,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentOutput {
    pub baseline_total_payments: u32,
    pub baseline_total_interest: Money,
    pub modified_schedule: Schedule,
    /// baseline interest minus modified interest; >= 0 for any valid
    /// positive intervention.
    pub interest_saved: Money,
    /// baseline payment count minus modified payment count; >= 0.
    pub term_shortened_by_periods: u32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Re-simulate the schedule under the intervention and diff it against the
/// baseline.
pub fn analyze_prepayment(
    input: &PrepaymentInput,
) -> RentalResult<ComputationOutput<PrepaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let baseline = schedule::build(&input.terms)?;
    let contract_rate = input.terms.contract_rate();
    let periodic_rate =
        rates::periodic_rate(contract_rate, input.terms.frequency, input.terms.compounding)?;
    let level_payment = payment::payment_at_frequency(
        input.terms.principal,
        contract_rate,
        input.terms.frequency,
        input.terms.compounding,
        input.terms.amortization_months,
    )?;

    let (modified, methodology) = match &input.intervention {
        Intervention::LumpSum {
            amount,
            applied_at_payment,
        } => {
            let modified = apply_lump_sum(
                &baseline,
                periodic_rate,
                level_payment,
                &input.terms,
                *amount,
                *applied_at_payment,
            )?;
            (modified, "Prepayment Scenario (Lump Sum)")
        }
        Intervention::PermanentIncrease {
            extra_per_payment,
            effective_from_payment,
        } => {
            let modified = apply_permanent_increase(
                &baseline,
                periodic_rate,
                level_payment,
                &input.terms,
                *extra_per_payment,
                *effective_from_payment,
            )?;
            (modified, "Prepayment Scenario (Increased Payment)")
        }
    };

    let interest_saved = baseline.total_interest - modified.total_interest;
    let term_shortened_by_periods = baseline
        .total_payments
        .saturating_sub(modified.total_payments);

    if interest_saved < dec!(1) {
        warnings.push("Intervention saves less than one dollar of interest".into());
    }

    let output = PrepaymentOutput {
        baseline_total_payments: baseline.total_payments,
        baseline_total_interest: baseline.total_interest,
        modified_schedule: modified,
        interest_saved,
        term_shortened_by_periods,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

// ---------------------------------------------------------------------------
// Interventions
// ---------------------------------------------------------------------------

fn apply_lump_sum(
    baseline: &Schedule,
    periodic_rate: Decimal,
    level_payment: Money,
    terms: &LoanTerms,
    amount: Money,
    applied_at_payment: u32,
) -> RentalResult<Schedule> {
    if amount <= Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "amount".into(),
            reason: "Lump sum must be positive".into(),
        });
    }
    if applied_at_payment == 0 || applied_at_payment > baseline.total_payments {
        return Err(RentalFinanceError::InvalidInput {
            field: "applied_at_payment".into(),
            reason: format!(
                "Reference payment must be between 1 and {}",
                baseline.total_payments
            ),
        });
    }

    let at = applied_at_payment as usize;
    let reference = &baseline.lines[at - 1];
    if amount > reference.remaining_balance {
        return Err(RentalFinanceError::InvalidInput {
            field: "amount".into(),
            reason: format!(
                "Lump sum {amount} exceeds the remaining balance {} at payment {applied_at_payment}",
                reference.remaining_balance
            ),
        });
    }

    // The lump rides on the reference payment as extra principal.
    let mut lines = baseline.lines[..at].to_vec();
    let last = &mut lines[at - 1];
    last.payment_amount += amount;
    last.principal_portion += amount;
    last.remaining_balance -= amount;
    let balance = last.remaining_balance;
    let resume_date = last.payment_date;

    if balance > Decimal::ZERO {
        let mut stepper = DateStepper::resume(resume_date, terms.frequency, applied_at_payment);
        let tail = schedule::amortize(
            balance,
            periodic_rate,
            level_payment,
            &mut stepper,
            applied_at_payment + 1,
        )?;
        lines.extend(tail);
    }

    Schedule::from_lines(lines)
}

fn apply_permanent_increase(
    baseline: &Schedule,
    periodic_rate: Decimal,
    level_payment: Money,
    terms: &LoanTerms,
    extra_per_payment: Money,
    effective_from_payment: u32,
) -> RentalResult<Schedule> {
    if extra_per_payment <= Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "extra_per_payment".into(),
            reason: "Extra payment must be positive".into(),
        });
    }
    if effective_from_payment == 0 || effective_from_payment > baseline.total_payments {
        return Err(RentalFinanceError::InvalidInput {
            field: "effective_from_payment".into(),
            reason: format!(
                "Reference payment must be between 1 and {}",
                baseline.total_payments
            ),
        });
    }

    let from = effective_from_payment as usize;
    let mut lines = baseline.lines[..from - 1].to_vec();
    let (balance, resume_date) = match lines.last() {
        Some(line) => (line.remaining_balance, line.payment_date),
        None => (terms.principal, terms.start_date),
    };

    let mut stepper = DateStepper::resume(resume_date, terms.frequency, effective_from_payment - 1);
    let tail = schedule::amortize(
        balance,
        periodic_rate,
        level_payment + extra_per_payment,
        &mut stepper,
        effective_from_payment,
    )?;
    lines.extend(tail);

    Schedule::from_lines(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Compounding, PaymentFrequency, RateKind};
    use chrono::NaiveDate;

    fn terms() -> LoanTerms {
        LoanTerms {
            principal: dec!(400000),
            annual_rate: dec!(0.0450),
            rate_kind: RateKind::Fixed,
            compounding: Compounding::SemiAnnual,
            amortization_months: 300,
            term_months: 60,
            frequency: PaymentFrequency::Monthly,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }

    fn lump(amount: Money, at: u32) -> PrepaymentInput {
        PrepaymentInput {
            terms: terms(),
            intervention: Intervention::LumpSum {
                amount,
                applied_at_payment: at,
            },
        }
    }

    fn increase(extra: Money, from: u32) -> PrepaymentInput {
        PrepaymentInput {
            terms: terms(),
            intervention: Intervention::PermanentIncrease {
                extra_per_payment: extra,
                effective_from_payment: from,
            },
        }
    }

    #[test]
    fn test_lump_sum_saves_interest_and_shortens_term() {
        let out = analyze_prepayment(&lump(dec!(20000), 12)).unwrap().result;
        assert!(out.interest_saved > Decimal::ZERO);
        assert!(out.term_shortened_by_periods > 0);
        assert!(out.modified_schedule.total_payments < out.baseline_total_payments);
    }

    #[test]
    fn test_lump_sum_keeps_original_payment_amount() {
        let out = analyze_prepayment(&lump(dec!(20000), 12)).unwrap().result;
        let lines = &out.modified_schedule.lines;
        // Payment 13 onward carries the original level payment, not a
        // reduced one.
        assert_eq!(lines[12].payment_amount, lines[0].payment_amount);
        // Payment 12 carries the lump on top of the level payment.
        assert_eq!(
            lines[11].payment_amount,
            lines[0].payment_amount + dec!(20000)
        );
    }

    #[test]
    fn test_lump_sum_balance_conservation() {
        let out = analyze_prepayment(&lump(dec!(20000), 12)).unwrap().result;
        let principal_sum: Decimal = out
            .modified_schedule
            .lines
            .iter()
            .map(|l| l.principal_portion)
            .sum();
        assert_eq!(principal_sum, dec!(400000));
        assert_eq!(
            out.modified_schedule.lines.last().unwrap().remaining_balance,
            Decimal::ZERO
        );
    }

    #[test]
    fn test_lump_sum_equal_to_balance_retires_loan() {
        let baseline = schedule::build(&terms()).unwrap();
        let balance_at_12 = baseline.lines[11].remaining_balance;
        let out = analyze_prepayment(&lump(balance_at_12, 12)).unwrap().result;
        assert_eq!(out.modified_schedule.total_payments, 12);
    }

    #[test]
    fn test_lump_sum_exceeding_balance_rejected() {
        let baseline = schedule::build(&terms()).unwrap();
        let balance_at_12 = baseline.lines[11].remaining_balance;
        let err = analyze_prepayment(&lump(balance_at_12 + dec!(0.01), 12)).unwrap_err();
        match err {
            RentalFinanceError::InvalidInput { field, .. } => assert_eq!(field, "amount"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_lump_rejected() {
        assert!(analyze_prepayment(&lump(Decimal::ZERO, 12)).is_err());
        assert!(analyze_prepayment(&lump(dec!(-100), 12)).is_err());
    }

    #[test]
    fn test_reference_payment_out_of_range_rejected() {
        assert!(analyze_prepayment(&lump(dec!(1000), 0)).is_err());
        assert!(analyze_prepayment(&lump(dec!(1000), 9999)).is_err());
        assert!(analyze_prepayment(&increase(dec!(100), 0)).is_err());
        assert!(analyze_prepayment(&increase(dec!(100), 9999)).is_err());
    }

    #[test]
    fn test_permanent_increase_saves_interest() {
        let out = analyze_prepayment(&increase(dec!(250), 1)).unwrap().result;
        assert!(out.interest_saved > Decimal::ZERO);
        assert!(out.term_shortened_by_periods > 0);
    }

    #[test]
    fn test_permanent_increase_from_first_payment_raises_every_line() {
        let out = analyze_prepayment(&increase(dec!(250), 1)).unwrap().result;
        let baseline_payment = schedule::build(&terms()).unwrap().lines[0].payment_amount;
        let lines = &out.modified_schedule.lines;
        for line in &lines[..lines.len() - 1] {
            assert_eq!(line.payment_amount, baseline_payment + dec!(250));
        }
    }

    #[test]
    fn test_permanent_increase_midway_keeps_head_unchanged() {
        let baseline = schedule::build(&terms()).unwrap();
        let out = analyze_prepayment(&increase(dec!(250), 61)).unwrap().result;
        assert_eq!(out.modified_schedule.lines[..60], baseline.lines[..60]);
        assert_eq!(
            out.modified_schedule.lines[60].payment_amount,
            baseline.lines[0].payment_amount + dec!(250)
        );
    }

    #[test]
    fn test_non_positive_extra_rejected() {
        assert!(analyze_prepayment(&increase(Decimal::ZERO, 1)).is_err());
        assert!(analyze_prepayment(&increase(dec!(-50), 1)).is_err());
    }

    #[test]
    fn test_dates_continue_through_the_intervention() {
        let out = analyze_prepayment(&lump(dec!(20000), 12)).unwrap().result;
        let lines = &out.modified_schedule.lines;
        assert_eq!(
            lines[12].payment_date,
            NaiveDate::from_ymd_opt(2027, 2, 1).unwrap()
        );
    }

    #[test]
    fn test_larger_lump_saves_more_interest() {
        let small = analyze_prepayment(&lump(dec!(5000), 12)).unwrap().result;
        let large = analyze_prepayment(&lump(dec!(25000), 12)).unwrap().result;
        assert!(large.interest_saved > small.interest_saved);
    }
}
