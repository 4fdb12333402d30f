//! Fixed periodic payment calculation.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentalFinanceError;
use crate::mortgage::{rates, PERIOD_CAP};
use crate::types::{
    with_metadata, Compounding, ComputationOutput, Money, PaymentFrequency, Rate, RateKind,
};
use crate::RentalResult;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// Input for a payment quote on a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Purchase price of the property.
    pub purchase_price: Money,
    /// Cash down payment; the financed principal is price minus down payment.
    pub down_payment: Money,
    /// Quoted annual rate (reference rate for variable loans).
    pub annual_rate: Rate,
    #[serde(default)]
    pub rate_kind: RateKind,
    #[serde(default)]
    pub compounding: Compounding,
    /// Amortization period in months.
    pub amortization_months: u32,
    pub frequency: PaymentFrequency,
}

/// Payment quote output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutput {
    /// Financed principal (price - down payment).
    pub principal: Money,
    /// Fixed payment per period at the requested frequency.
    pub periodic_payment: Money,
    /// Payment restated on a monthly basis (payment * periods-per-year / 12).
    pub monthly_equivalent: Money,
    pub payments_per_year: u32,
    /// Periods actually needed to retire the loan. For accelerated
    /// frequencies this is fewer than the solved amortization length.
    pub scheduled_periods: u32,
    /// Total of all payments including the adjusted final payment.
    pub total_paid: Money,
    /// Lifetime interest over the amortization.
    pub total_interest: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Quote the fixed periodic payment for a purchase and summarize lifetime cost.
pub fn calculate_payment(input: &PaymentInput) -> RentalResult<ComputationOutput<PaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.purchase_price <= Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "purchase_price".into(),
            reason: "Purchase price must be positive".into(),
        });
    }
    if input.down_payment < Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "down_payment".into(),
            reason: "Down payment cannot be negative".into(),
        });
    }
    let principal = input.purchase_price - input.down_payment;
    if principal <= Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "down_payment".into(),
            reason: "Down payment must be less than the purchase price".into(),
        });
    }

    let annual = match &input.rate_kind {
        RateKind::Fixed => input.annual_rate,
        RateKind::Variable { spread } => input.annual_rate + *spread,
    };
    if annual > dec!(0.10) {
        warnings.push(format!("Contract rate {annual} exceeds 10%; verify the quote"));
    }
    if input.amortization_months > 360 {
        warnings.push("Amortization beyond 30 years is unusual for rental financing".into());
    }

    let periodic_rate = rates::periodic_rate(annual, input.frequency, input.compounding)?;
    let payment = payment_at_frequency(
        principal,
        annual,
        input.frequency,
        input.compounding,
        input.amortization_months,
    )?;

    let (scheduled_periods, total_paid, total_interest) =
        run_off(principal, periodic_rate, payment)?;

    let ppy = input.frequency.payments_per_year();
    let output = PaymentOutput {
        principal,
        periodic_payment: payment,
        monthly_equivalent: payment * Decimal::from(ppy) / dec!(12),
        payments_per_year: ppy,
        scheduled_periods,
        total_paid,
        total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed Periodic Mortgage Payment",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Core formulas
// ---------------------------------------------------------------------------

/// Annuity payment: P * i(1+i)^n / ((1+i)^n - 1), straight-line when i = 0.
/// Rounded to the cent; the schedule's final-period clamp absorbs the drift.
pub fn periodic_payment(
    principal: Money,
    periodic_rate: Rate,
    total_periods: u32,
) -> RentalResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if total_periods == 0 {
        return Err(RentalFinanceError::InvalidInput {
            field: "total_periods".into(),
            reason: "Total periods must be greater than zero".into(),
        });
    }
    if periodic_rate < Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "periodic_rate".into(),
            reason: "Periodic rate cannot be negative".into(),
        });
    }

    let raw = if periodic_rate.is_zero() {
        principal / Decimal::from(total_periods)
    } else {
        let compound = rates::compound_factor(periodic_rate, total_periods);
        let denominator = compound - Decimal::ONE;
        if denominator.is_zero() {
            return Err(RentalFinanceError::DivisionByZero {
                context: "annuity payment denominator".into(),
            });
        }
        principal * periodic_rate * compound / denominator
    };

    Ok(round_cents(raw))
}

/// Payment at the requested frequency, honouring the accelerated convention:
/// accelerated bi-weekly/weekly pay the monthly payment divided by 2/4
/// rather than a payment solved at their own frequency.
pub(crate) fn payment_at_frequency(
    principal: Money,
    annual_rate: Rate,
    frequency: PaymentFrequency,
    compounding: Compounding,
    amortization_months: u32,
) -> RentalResult<Money> {
    match frequency.accelerated_divisor() {
        Some(divisor) => {
            let monthly_rate =
                rates::periodic_rate(annual_rate, PaymentFrequency::Monthly, compounding)?;
            let monthly_periods = rates::total_periods(amortization_months, PaymentFrequency::Monthly)?;
            let monthly_payment = periodic_payment(principal, monthly_rate, monthly_periods)?;
            Ok(round_cents(monthly_payment / divisor))
        }
        None => {
            let rate = rates::periodic_rate(annual_rate, frequency, compounding)?;
            let periods = rates::total_periods(amortization_months, frequency)?;
            periodic_payment(principal, rate, periods)
        }
    }
}

/// Run the balance to zero and return (periods, total paid, total interest).
/// Interest accrues in rounded cents, matching the schedule ledger, and the
/// final payment is clamped so the run-off terminates exactly.
fn run_off(principal: Money, periodic_rate: Rate, payment: Money) -> RentalResult<(u32, Money, Money)> {
    let mut balance = principal;
    let mut periods = 0u32;
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;

    while balance > Decimal::ZERO {
        periods += 1;
        if periods > PERIOD_CAP {
            return Err(RentalFinanceError::Computation {
                context: "payment run-off failed to terminate within the period cap".into(),
            });
        }

        let interest = round_cents(balance * periodic_rate);
        let principal_portion = payment - interest;
        if principal_portion <= Decimal::ZERO {
            return Err(RentalFinanceError::Computation {
                context: "payment does not cover accruing interest".into(),
            });
        }

        if principal_portion >= balance {
            total_paid += balance + interest;
            total_interest += interest;
            balance = Decimal::ZERO;
        } else {
            total_paid += payment;
            total_interest += interest;
            balance -= principal_portion;
        }
    }

    Ok((periods, total_paid, total_interest))
}

pub(crate) fn round_cents(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote() -> PaymentInput {
        PaymentInput {
            purchase_price: dec!(500000),
            down_payment: dec!(100000),
            annual_rate: dec!(0.055),
            rate_kind: RateKind::Fixed,
            compounding: Compounding::Nominal,
            amortization_months: 300,
            frequency: PaymentFrequency::Monthly,
        }
    }

    #[test]
    fn test_zero_rate_payment_exact() {
        let payment = periodic_payment(dec!(120000), Decimal::ZERO, 120).unwrap();
        assert_eq!(payment, dec!(1000.00));
    }

    #[test]
    fn test_quote_scenario_500k_with_100k_down() {
        // 400k at 5.5% nominal monthly over 25 years: ~2457.30/mo,
        // lifetime interest ~337,190.
        let out = calculate_payment(&quote()).unwrap().result;
        assert_eq!(out.principal, dec!(400000));
        assert!(
            (out.periodic_payment - dec!(2457.30)).abs() < dec!(1.00),
            "payment {}",
            out.periodic_payment
        );
        assert!(
            out.total_interest > dec!(336400) && out.total_interest < dec!(337300),
            "interest {}",
            out.total_interest
        );
        assert_eq!(out.payments_per_year, 12);
        assert_eq!(out.scheduled_periods, 300);
    }

    #[test]
    fn test_monthly_equivalent_for_monthly_is_identity() {
        let out = calculate_payment(&quote()).unwrap().result;
        assert_eq!(out.monthly_equivalent, out.periodic_payment);
    }

    #[test]
    fn test_accelerated_bi_weekly_is_half_monthly() {
        let monthly = payment_at_frequency(
            dec!(400000),
            dec!(0.055),
            PaymentFrequency::Monthly,
            Compounding::SemiAnnual,
            300,
        )
        .unwrap();
        let acc = payment_at_frequency(
            dec!(400000),
            dec!(0.055),
            PaymentFrequency::AcceleratedBiWeekly,
            Compounding::SemiAnnual,
            300,
        )
        .unwrap();
        assert_eq!(acc, round_cents(monthly / dec!(2)));
    }

    #[test]
    fn test_accelerated_weekly_is_quarter_monthly() {
        let monthly = payment_at_frequency(
            dec!(400000),
            dec!(0.055),
            PaymentFrequency::Monthly,
            Compounding::SemiAnnual,
            300,
        )
        .unwrap();
        let acc = payment_at_frequency(
            dec!(400000),
            dec!(0.055),
            PaymentFrequency::AcceleratedWeekly,
            Compounding::SemiAnnual,
            300,
        )
        .unwrap();
        assert_eq!(acc, round_cents(monthly / dec!(4)));
    }

    #[test]
    fn test_accelerated_retires_loan_early() {
        let mut input = quote();
        input.frequency = PaymentFrequency::AcceleratedBiWeekly;
        input.compounding = Compounding::SemiAnnual;
        let acc = calculate_payment(&input).unwrap().result;
        // 650 bi-weekly periods would match the straight amortization;
        // accelerated should need meaningfully fewer.
        assert!(
            acc.scheduled_periods < 650,
            "periods {}",
            acc.scheduled_periods
        );

        let mut straight = quote();
        straight.frequency = PaymentFrequency::BiWeekly;
        straight.compounding = Compounding::SemiAnnual;
        let base = calculate_payment(&straight).unwrap().result;
        assert!(acc.total_interest < base.total_interest);
    }

    #[test]
    fn test_straight_bi_weekly_payment_is_independently_solved() {
        let bi = payment_at_frequency(
            dec!(400000),
            dec!(0.055),
            PaymentFrequency::BiWeekly,
            Compounding::SemiAnnual,
            300,
        )
        .unwrap();
        let monthly = payment_at_frequency(
            dec!(400000),
            dec!(0.055),
            PaymentFrequency::Monthly,
            Compounding::SemiAnnual,
            300,
        )
        .unwrap();
        // A solved bi-weekly payment is less than half the monthly payment.
        assert!(bi < monthly / dec!(2));
    }

    #[test]
    fn test_down_payment_at_or_above_price_rejected() {
        let mut input = quote();
        input.down_payment = dec!(500000);
        assert!(calculate_payment(&input).is_err());
    }

    #[test]
    fn test_non_positive_principal_rejected() {
        assert!(periodic_payment(Decimal::ZERO, dec!(0.004), 300).is_err());
        assert!(periodic_payment(dec!(-1), dec!(0.004), 300).is_err());
    }

    #[test]
    fn test_zero_periods_rejected() {
        assert!(periodic_payment(dec!(100000), dec!(0.004), 0).is_err());
    }

    #[test]
    fn test_high_rate_warns() {
        let mut input = quote();
        input.annual_rate = dec!(0.12);
        let out = calculate_payment(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("10%")));
    }
}
