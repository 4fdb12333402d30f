//! Amortization schedule generation: expands `LoanTerms` into a
//! payment-by-payment ledger with exact zero termination.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentalFinanceError;
use crate::mortgage::{payment, rates, PERIOD_CAP};
use crate::types::{with_metadata, ComputationOutput, LoanTerms, Money, PaymentFrequency, Rate};
use crate::RentalResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One row of the ledger. `principal_portion + interest_portion` equals
/// `payment_amount` exactly; `remaining_balance` steps down by the principal
/// portion and terminates at exactly zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLine {
    pub payment_number: u32,
    pub payment_date: NaiveDate,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

/// Full ledger plus derived totals. Regenerable deterministically from the
/// same `LoanTerms`; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub lines: Vec<PaymentLine>,
    pub total_payments: u32,
    pub total_interest: Money,
    pub final_payment_date: NaiveDate,
}

impl Schedule {
    pub(crate) fn from_lines(lines: Vec<PaymentLine>) -> RentalResult<Self> {
        let last = lines.last().ok_or_else(|| RentalFinanceError::Computation {
            context: "schedule produced no payment lines".into(),
        })?;
        let final_payment_date = last.payment_date;
        let total_interest = lines.iter().map(|l| l.interest_portion).sum();
        Ok(Schedule {
            total_payments: lines.len() as u32,
            total_interest,
            final_payment_date,
            lines,
        })
    }
}

/// Input for schedule generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub terms: LoanTerms,
}

// ---------------------------------------------------------------------------
// Date stepping
// ---------------------------------------------------------------------------

/// Advances payment dates by the frequency's calendar interval: +1 month,
/// alternating 15/16 days (semi-monthly), +14 days, or +7 days. Tracks the
/// global step index so a resumed stepper keeps the 15/16 alternation.
#[derive(Debug, Clone)]
pub(crate) struct DateStepper {
    current: NaiveDate,
    frequency: PaymentFrequency,
    step_index: u32,
}

impl DateStepper {
    pub(crate) fn new(start: NaiveDate, frequency: PaymentFrequency) -> Self {
        DateStepper {
            current: start,
            frequency,
            step_index: 0,
        }
    }

    /// Resume stepping after `steps_elapsed` periods have already been dated.
    pub(crate) fn resume(date: NaiveDate, frequency: PaymentFrequency, steps_elapsed: u32) -> Self {
        DateStepper {
            current: date,
            frequency,
            step_index: steps_elapsed,
        }
    }

    pub(crate) fn next(&mut self) -> RentalResult<NaiveDate> {
        let next = match self.frequency {
            PaymentFrequency::Monthly => self.current.checked_add_months(Months::new(1)),
            PaymentFrequency::SemiMonthly => {
                let days = if self.step_index % 2 == 0 { 15 } else { 16 };
                self.current.checked_add_days(Days::new(days))
            }
            PaymentFrequency::BiWeekly | PaymentFrequency::AcceleratedBiWeekly => {
                self.current.checked_add_days(Days::new(14))
            }
            PaymentFrequency::Weekly | PaymentFrequency::AcceleratedWeekly => {
                self.current.checked_add_days(Days::new(7))
            }
        }
        .ok_or_else(|| RentalFinanceError::Computation {
            context: "payment date overflowed the calendar range".into(),
        })?;
        self.step_index += 1;
        self.current = next;
        Ok(next)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate the full amortization schedule for a loan.
pub fn generate_schedule(input: &ScheduleInput) -> RentalResult<ComputationOutput<Schedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.terms.amortization_months > 360 {
        warnings.push("Amortization beyond 30 years is unusual for rental financing".into());
    }
    if input.terms.contract_rate() > dec!(0.10) {
        warnings.push(format!(
            "Contract rate {} exceeds 10%; verify the quote",
            input.terms.contract_rate()
        ));
    }

    let schedule = build(&input.terms)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Amortization Schedule (Level Payment)",
        input,
        warnings,
        elapsed,
        schedule,
    ))
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Build a schedule directly from validated terms. Shared by the prepayment,
/// refinance, and forecast modules.
pub(crate) fn build(terms: &LoanTerms) -> RentalResult<Schedule> {
    terms.validate()?;

    let contract_rate = terms.contract_rate();
    let periodic_rate = rates::periodic_rate(contract_rate, terms.frequency, terms.compounding)?;
    let pay = payment::payment_at_frequency(
        terms.principal,
        contract_rate,
        terms.frequency,
        terms.compounding,
        terms.amortization_months,
    )?;

    let mut stepper = DateStepper::new(terms.start_date, terms.frequency);
    let lines = amortize(terms.principal, periodic_rate, pay, &mut stepper, 1)?;
    Schedule::from_lines(lines)
}

/// Iterate the level-payment recurrence until the balance reaches zero.
/// Each period's interest accrual is rounded to the cent before the split,
/// so every ledger amount is an exact currency value and the principal
/// portions sum to the opening balance with no residue. On the final period
/// the principal portion is clamped to the outstanding balance and the
/// payment adjusted to match, absorbing rounding drift.
pub(crate) fn amortize(
    opening_balance: Money,
    periodic_rate: Rate,
    payment: Money,
    stepper: &mut DateStepper,
    first_number: u32,
) -> RentalResult<Vec<PaymentLine>> {
    let mut lines: Vec<PaymentLine> = Vec::new();
    let mut balance = opening_balance;
    let mut number = first_number;

    while balance > Decimal::ZERO {
        if number - first_number >= PERIOD_CAP {
            return Err(RentalFinanceError::Computation {
                context: "amortization failed to terminate within the period cap".into(),
            });
        }

        let interest_portion = payment::round_cents(balance * periodic_rate);
        let mut principal_portion = payment - interest_portion;
        if principal_portion <= Decimal::ZERO {
            return Err(RentalFinanceError::Computation {
                context: "payment does not cover accruing interest".into(),
            });
        }

        let mut payment_amount = payment;
        if principal_portion >= balance {
            principal_portion = balance;
            payment_amount = principal_portion + interest_portion;
        }
        balance -= principal_portion;

        lines.push(PaymentLine {
            payment_number: number,
            payment_date: stepper.next()?,
            payment_amount,
            principal_portion,
            interest_portion,
            remaining_balance: balance,
        });
        number += 1;
    }

    Ok(lines)
}
