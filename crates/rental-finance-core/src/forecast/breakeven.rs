//! Break-even occupancy: the vacancy rate at which annual cash flow is zero.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentalFinanceError;
use crate::property::ExpenseLine;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::RentalResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenInput {
    pub monthly_rent: Money,
    pub operating_expenses: Vec<ExpenseLine>,
    /// Annual debt service from the active schedule.
    pub annual_debt_service: Money,
    /// Current vacancy assumption, as a decimal.
    pub current_vacancy_rate: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenOutput {
    pub potential_gross_income: Money,
    pub annual_operating_expenses: Money,
    pub annual_debt_service: Money,
    /// Share of potential gross income consumed by operating costs and debt
    /// service, as a decimal (display conversion to percent belongs to the
    /// caller). Annual cash flow hits zero when collected rent falls to this
    /// fraction of potential income.
    pub break_even_vacancy_rate: Rate,
    /// break-even ratio minus current vacancy; negative means the property is
    /// already cash-flow negative at the assumed vacancy.
    pub safety_margin: Rate,
}

/// Derive the vacancy rate at which the property's annual cash flow is zero.
pub fn break_even_vacancy(
    input: &BreakEvenInput,
) -> RentalResult<ComputationOutput<BreakEvenOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.monthly_rent <= Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "monthly_rent".into(),
            reason: "Monthly rent must be positive".into(),
        });
    }
    if input.annual_debt_service < Decimal::ZERO {
        return Err(RentalFinanceError::InvalidInput {
            field: "annual_debt_service".into(),
            reason: "Annual debt service cannot be negative".into(),
        });
    }
    if input.current_vacancy_rate < Decimal::ZERO || input.current_vacancy_rate > Decimal::ONE {
        return Err(RentalFinanceError::InvalidInput {
            field: "current_vacancy_rate".into(),
            reason: "Vacancy rate must be a decimal between 0 and 1".into(),
        });
    }

    // Positive rent above guarantees the divisor below is nonzero.
    let potential_gross_income = input.monthly_rent * dec!(12);

    let annual_operating_expenses: Money = input
        .operating_expenses
        .iter()
        .map(|e| e.monthly_amount)
        .sum::<Decimal>()
        * dec!(12);

    let break_even_vacancy_rate =
        (annual_operating_expenses + input.annual_debt_service) / potential_gross_income;
    let safety_margin = break_even_vacancy_rate - input.current_vacancy_rate;

    if break_even_vacancy_rate > Decimal::ONE {
        warnings.push(
            "Operating costs and debt service exceed potential gross income; cash flow is negative even at full occupancy"
                .into(),
        );
    }
    if safety_margin < Decimal::ZERO {
        warnings.push("Current vacancy assumption already exceeds the break-even ratio".into());
    }

    let output = BreakEvenOutput {
        potential_gross_income,
        annual_operating_expenses,
        annual_debt_service: input.annual_debt_service,
        break_even_vacancy_rate,
        safety_margin,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Break-Even Vacancy Analysis",
        input,
        warnings,
        elapsed,
        output,
    ))
}
