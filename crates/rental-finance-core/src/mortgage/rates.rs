//! Rate conversion: annual quoted rate + payment frequency -> per-period rate.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::RentalFinanceError;
use crate::types::{Compounding, PaymentFrequency, Rate, MAX_AMORTIZATION_MONTHS, MAX_CONTRACT_RATE};
use crate::RentalResult;

/// Per-period rate for the given frequency under the given convention.
///
/// Semi-annual compounding: (1 + r/2)^(2/N) - 1 for N payments/year.
/// Nominal: r/N. Accelerated frequencies use the same periodic rate as
/// their straight counterpart; only the payment amount differs.
pub fn periodic_rate(
    annual: Rate,
    frequency: PaymentFrequency,
    compounding: Compounding,
) -> RentalResult<Rate> {
    if annual < Decimal::ZERO || annual > MAX_CONTRACT_RATE {
        return Err(RentalFinanceError::InvalidInput {
            field: "annual_rate".into(),
            reason: format!(
                "Annual rate {annual} is outside the supported range [0, {MAX_CONTRACT_RATE}]"
            ),
        });
    }

    let periods = Decimal::from(frequency.payments_per_year());
    match compounding {
        Compounding::SemiAnnual => {
            let base = Decimal::ONE + annual / dec!(2);
            let exponent = dec!(2) / periods;
            Ok(base.powd(exponent) - Decimal::ONE)
        }
        Compounding::Nominal => Ok(annual / periods),
    }
}

/// Amortization length converted to whole periods at the target frequency,
/// rounded to the nearest period.
pub fn total_periods(amortization_months: u32, frequency: PaymentFrequency) -> RentalResult<u32> {
    if amortization_months == 0 || amortization_months > MAX_AMORTIZATION_MONTHS {
        return Err(RentalFinanceError::InvalidInput {
            field: "amortization_months".into(),
            reason: format!("Amortization must be between 1 and {MAX_AMORTIZATION_MONTHS} months"),
        });
    }
    let ppy = frequency.payments_per_year();
    Ok((amortization_months * ppy + 6) / 12)
}

/// (1 + rate)^periods via iterative multiplication (avoids Decimal::powd
/// drift on integer exponents).
pub(crate) fn compound_factor(rate: Rate, periods: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..periods {
        result *= factor;
    }
    result
}
