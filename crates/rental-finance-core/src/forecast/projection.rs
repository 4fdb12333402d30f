//! 10-year cash-flow and equity forecast under compounding growth
//! assumptions, with renewal-aware debt service.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentalFinanceError;
use crate::mortgage::rates;
use crate::mortgage::schedule::{self, Schedule};
use crate::property::Property;
use crate::types::{
    with_metadata, ComputationOutput, LoanTerms, Money, Rate, RateKind, MAX_CONTRACT_RATE,
};
use crate::RentalResult;

/// Forecasts always run ten years; the horizon is a product convention, not
/// an input.
pub const FORECAST_HORIZON_YEARS: u32 = 10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Growth and exit assumptions, all decimals in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastAssumptions {
    pub annual_rent_growth: Rate,
    pub annual_expense_inflation: Rate,
    pub annual_appreciation: Rate,
    pub vacancy_rate: Rate,
    /// Rate applied when the current term matures and the balance renews.
    pub future_interest_rate: Rate,
    /// Capitalization rate applied to year-10 NOI for sale proceeds.
    pub exit_cap_rate: Rate,
}

impl ForecastAssumptions {
    fn validate(&self) -> RentalResult<()> {
        for (field, value) in [
            ("annual_rent_growth", self.annual_rent_growth),
            ("annual_expense_inflation", self.annual_expense_inflation),
            ("annual_appreciation", self.annual_appreciation),
            ("vacancy_rate", self.vacancy_rate),
            ("future_interest_rate", self.future_interest_rate),
            ("exit_cap_rate", self.exit_cap_rate),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(RentalFinanceError::InvalidInput {
                    field: field.into(),
                    reason: format!("{field} must be a decimal between 0 and 1, got {value}"),
                });
            }
        }
        if self.future_interest_rate > MAX_CONTRACT_RATE {
            return Err(RentalFinanceError::InvalidInput {
                field: "future_interest_rate".into(),
                reason: format!(
                    "Renewal rate must not exceed {MAX_CONTRACT_RATE}"
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastInput {
    pub property: Property,
    pub assumptions: ForecastAssumptions,
}

/// One projected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastYear {
    pub year: u32,
    pub gross_rental_income: Money,
    pub operating_expenses: Money,
    pub debt_service: Money,
    pub net_operating_income: Money,
    pub net_cash_flow: Money,
    pub property_value: Money,
    pub mortgage_balance: Money,
    pub equity: Money,
}

/// Capital-flow totals over the horizon, for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalFlowTotals {
    pub total_rental_income: Money,
    pub total_operating_expenses: Money,
    /// All debt service over the horizon plus the balance paid off at sale.
    pub total_debt_paid: Money,
    pub total_net_cash_flow: Money,
    /// Purchase price minus the original loan amount.
    pub initial_equity: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutput {
    pub years: Vec<ForecastYear>,
    /// Year-10 NOI capitalized at the exit cap rate. Deliberately an
    /// income-approach value, reported alongside the appreciation track.
    pub sale_proceeds_gross: Money,
    /// propertyValue(10) from the appreciation track.
    pub appreciated_value_at_horizon: Money,
    pub totals: CapitalFlowTotals,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project income, expenses, debt service, value, and equity over ten years.
/// Pure over its inputs: identical inputs produce identical outputs.
pub fn run_forecast(input: &ForecastInput) -> RentalResult<ComputationOutput<ForecastOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.assumptions.validate()?;
    let property = &input.property;

    if property.monthly_rent <= Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "monthly_rent".into(),
            reason: "Property rent snapshot must be positive".into(),
        });
    }
    let terms = property.mortgage.as_ref().ok_or_else(|| {
        RentalFinanceError::InsufficientData(
            "Property has no mortgage snapshot; attach loan terms before forecasting".into(),
        )
    })?;

    if input.assumptions.vacancy_rate > dec!(0.15) {
        warnings.push(format!(
            "Vacancy assumption {:.1}% is above typical market norms",
            input.assumptions.vacancy_rate * dec!(100)
        ));
    }
    if property.operating_expenses.is_empty() {
        warnings.push("Property has no operating expense categories; NOI equals effective rent".into());
    }

    let ledger = renewal_schedule(terms, input.assumptions.future_interest_rate)?;
    let ppy = terms.frequency.payments_per_year();

    let mut years: Vec<ForecastYear> = Vec::with_capacity(FORECAST_HORIZON_YEARS as usize);
    let mut gross_rental_income = property.annual_rent();
    let mut operating_expenses = property.annual_operating_expenses();
    let mut property_value = property.current_market_value;

    let mut total_rental_income = Decimal::ZERO;
    let mut total_operating_expenses = Decimal::ZERO;
    let mut total_debt_service = Decimal::ZERO;
    let mut total_net_cash_flow = Decimal::ZERO;

    for year in 1..=FORECAST_HORIZON_YEARS {
        gross_rental_income *= Decimal::ONE + input.assumptions.annual_rent_growth;
        operating_expenses *= Decimal::ONE + input.assumptions.annual_expense_inflation;
        property_value *= Decimal::ONE + input.assumptions.annual_appreciation;

        let debt_service = debt_service_in_year(&ledger, ppy, year);
        let net_operating_income =
            gross_rental_income * (Decimal::ONE - input.assumptions.vacancy_rate)
                - operating_expenses;
        let net_cash_flow = net_operating_income - debt_service;
        let mortgage_balance = balance_at_year_end(&ledger, ppy, year);
        let equity = property_value - mortgage_balance;

        total_rental_income += gross_rental_income;
        total_operating_expenses += operating_expenses;
        total_debt_service += debt_service;
        total_net_cash_flow += net_cash_flow;

        years.push(ForecastYear {
            year,
            gross_rental_income,
            operating_expenses,
            debt_service,
            net_operating_income,
            net_cash_flow,
            property_value,
            mortgage_balance,
            equity,
        });
    }

    let final_year = &years[years.len() - 1];
    if input.assumptions.exit_cap_rate.is_zero() {
        return Err(RentalFinanceError::DivisionByZero {
            context: "sale proceeds (year-10 NOI / exit cap rate)".into(),
        });
    }
    let sale_proceeds_gross = final_year.net_operating_income / input.assumptions.exit_cap_rate;
    if final_year.net_operating_income <= Decimal::ZERO {
        warnings.push("Year-10 NOI is not positive; capitalized sale proceeds are unreliable".into());
    }

    let payoff_at_sale = final_year.mortgage_balance;
    let totals = CapitalFlowTotals {
        total_rental_income,
        total_operating_expenses,
        total_debt_paid: total_debt_service + payoff_at_sale,
        total_net_cash_flow,
        initial_equity: property.purchase_price - terms.principal,
    };

    let output = ForecastOutput {
        appreciated_value_at_horizon: final_year.property_value,
        sale_proceeds_gross,
        years,
        totals,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "10-Year Rental Investment Forecast",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Debt service
// ---------------------------------------------------------------------------

/// Schedule with the renewal applied: when the contract term ends before the
/// amortization does, the remaining balance re-amortizes at the renewal rate
/// over the remaining months, at the same frequency.
fn renewal_schedule(terms: &LoanTerms, future_rate: Rate) -> RentalResult<Schedule> {
    let full = schedule::build(terms)?;
    if terms.term_months >= terms.amortization_months {
        return Ok(full);
    }

    let term_periods = rates::total_periods(terms.term_months, terms.frequency)? as usize;
    if term_periods >= full.lines.len() {
        return Ok(full);
    }

    let head = full.lines[..term_periods].to_vec();
    // term_periods >= 1 because term_months >= 1
    let last = &head[head.len() - 1];
    let renewal = LoanTerms {
        principal: last.remaining_balance,
        annual_rate: future_rate,
        rate_kind: RateKind::Fixed,
        compounding: terms.compounding,
        amortization_months: terms.amortization_months - terms.term_months,
        term_months: terms.amortization_months - terms.term_months,
        frequency: terms.frequency,
        start_date: last.payment_date,
    };
    let tail = schedule::build(&renewal)?;

    let offset = term_periods as u32;
    let mut lines = head;
    lines.extend(tail.lines.into_iter().map(|mut line| {
        line.payment_number += offset;
        line
    }));
    Schedule::from_lines(lines)
}

/// Payments whose number falls in year `year`'s bucket of periods.
fn debt_service_in_year(ledger: &Schedule, ppy: u32, year: u32) -> Money {
    let lower = (year - 1) * ppy;
    let upper = year * ppy;
    ledger
        .lines
        .iter()
        .filter(|l| l.payment_number > lower && l.payment_number <= upper)
        .map(|l| l.payment_amount)
        .sum()
}

fn balance_at_year_end(ledger: &Schedule, ppy: u32, year: u32) -> Money {
    let target = (year * ppy) as usize;
    if ledger.lines.len() <= target {
        return Decimal::ZERO;
    }
    ledger.lines[target - 1].remaining_balance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::ExpenseLine;
    use crate::types::{Compounding, PaymentFrequency};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn mortgage() -> LoanTerms {
        LoanTerms {
            principal: dec!(400000),
            annual_rate: dec!(0.045),
            rate_kind: RateKind::Fixed,
            compounding: Compounding::SemiAnnual,
            amortization_months: 300,
            term_months: 60,
            frequency: PaymentFrequency::Monthly,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }

    fn property() -> Property {
        Property {
            id: "p1".into(),
            name: "Duplex on 5th".into(),
            purchase_price: dec!(500000),
            current_market_value: dec!(520000),
            monthly_rent: dec!(3200),
            operating_expenses: vec![
                ExpenseLine {
                    label: "Property tax".into(),
                    monthly_amount: dec!(400),
                },
                ExpenseLine {
                    label: "Insurance".into(),
                    monthly_amount: dec!(150),
                },
                ExpenseLine {
                    label: "Maintenance".into(),
                    monthly_amount: dec!(250),
                },
            ],
            mortgage: Some(mortgage()),
        }
    }

    fn assumptions() -> ForecastAssumptions {
        ForecastAssumptions {
            annual_rent_growth: dec!(0.03),
            annual_expense_inflation: dec!(0.02),
            annual_appreciation: dec!(0.04),
            vacancy_rate: dec!(0.05),
            future_interest_rate: dec!(0.045),
            exit_cap_rate: dec!(0.055),
        }
    }

    fn input() -> ForecastInput {
        ForecastInput {
            property: property(),
            assumptions: assumptions(),
        }
    }

    #[test]
    fn test_forecast_is_idempotent() {
        let a = run_forecast(&input()).unwrap().result;
        let b = run_forecast(&input()).unwrap().result;
        assert_eq!(a, b);
    }

    #[test]
    fn test_ten_years_projected() {
        let out = run_forecast(&input()).unwrap().result;
        assert_eq!(out.years.len(), 10);
        assert_eq!(out.years[0].year, 1);
        assert_eq!(out.years[9].year, 10);
    }

    #[test]
    fn test_year_one_growth_applied_once() {
        let out = run_forecast(&input()).unwrap().result;
        // Year 1 income is the current annual rent grown one year.
        assert_eq!(out.years[0].gross_rental_income, dec!(3200) * dec!(12) * dec!(1.03));
        assert_eq!(
            out.years[0].operating_expenses,
            dec!(800) * dec!(12) * dec!(1.02)
        );
        assert_eq!(out.years[0].property_value, dec!(520000) * dec!(1.04));
    }

    #[test]
    fn test_noi_and_cash_flow_identities() {
        let out = run_forecast(&input()).unwrap().result;
        for year in &out.years {
            assert_eq!(
                year.net_operating_income,
                year.gross_rental_income * dec!(0.95) - year.operating_expenses
            );
            assert_eq!(year.net_cash_flow, year.net_operating_income - year.debt_service);
            assert_eq!(year.equity, year.property_value - year.mortgage_balance);
        }
    }

    #[test]
    fn test_year_one_debt_service_is_twelve_payments() {
        let out = run_forecast(&input()).unwrap().result;
        let payment = schedule::build(&mortgage()).unwrap().lines[0].payment_amount;
        assert_eq!(out.years[0].debt_service, payment * dec!(12));
    }

    #[test]
    fn test_mortgage_balance_declines_every_year() {
        let out = run_forecast(&input()).unwrap().result;
        let mut previous = dec!(400000);
        for year in &out.years {
            assert!(year.mortgage_balance < previous);
            previous = year.mortgage_balance;
        }
    }

    #[test]
    fn test_renewal_at_lower_rate_cuts_debt_service() {
        let mut i = input();
        i.assumptions.future_interest_rate = dec!(0.02);
        let out = run_forecast(&i).unwrap().result;
        // Term ends after year 5; year 6 runs on the renewed payment.
        assert!(out.years[5].debt_service < out.years[4].debt_service);
    }

    #[test]
    fn test_renewal_at_same_rate_keeps_debt_service_close() {
        let out = run_forecast(&input()).unwrap().result;
        let before = out.years[4].debt_service;
        let after = out.years[5].debt_service;
        // Re-amortizing the same balance at the same rate over the remaining
        // months reproduces the payment to within rounding.
        assert!((before - after).abs() < dec!(1), "{before} vs {after}");
    }

    #[test]
    fn test_sale_proceeds_capitalize_final_noi() {
        let out = run_forecast(&input()).unwrap().result;
        assert_eq!(
            out.sale_proceeds_gross,
            out.years[9].net_operating_income / dec!(0.055)
        );
        // The income-approach value is distinct from the appreciation track.
        assert_eq!(
            out.appreciated_value_at_horizon,
            out.years[9].property_value
        );
    }

    #[test]
    fn test_capital_flow_totals() {
        let out = run_forecast(&input()).unwrap().result;
        let income: Decimal = out.years.iter().map(|y| y.gross_rental_income).sum();
        let ds: Decimal = out.years.iter().map(|y| y.debt_service).sum();
        assert_eq!(out.totals.total_rental_income, income);
        assert_eq!(
            out.totals.total_debt_paid,
            ds + out.years[9].mortgage_balance
        );
        assert_eq!(out.totals.initial_equity, dec!(100000));
    }

    #[test]
    fn test_missing_mortgage_is_insufficient_data() {
        let mut i = input();
        i.property.mortgage = None;
        match run_forecast(&i).unwrap_err() {
            RentalFinanceError::InsufficientData(_) => {}
            other => panic!("Expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_assumption_rejected() {
        let mut i = input();
        i.assumptions.vacancy_rate = dec!(1.5);
        assert!(run_forecast(&i).is_err());
        let mut i = input();
        i.assumptions.annual_rent_growth = dec!(-0.01);
        assert!(run_forecast(&i).is_err());
    }

    #[test]
    fn test_zero_exit_cap_is_division_by_zero() {
        let mut i = input();
        i.assumptions.exit_cap_rate = Decimal::ZERO;
        match run_forecast(&i).unwrap_err() {
            RentalFinanceError::DivisionByZero { .. } => {}
            other => panic!("Expected DivisionByZero, got {other:?}"),
        }
    }

    #[test]
    fn test_high_vacancy_warns() {
        let mut i = input();
        i.assumptions.vacancy_rate = dec!(0.2);
        let out = run_forecast(&i).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("market norms")));
    }
}
