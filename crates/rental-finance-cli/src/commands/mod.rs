pub mod forecast;
pub mod mortgage;

use rental_finance_core::types::{Compounding, PaymentFrequency};

/// Parse a frequency flag value. Accepts the kebab-case names used in help
/// text plus the short aliases quoted by lenders.
pub(crate) fn parse_frequency(
    value: &str,
) -> Result<PaymentFrequency, Box<dyn std::error::Error>> {
    match value.to_ascii_lowercase().as_str() {
        "monthly" => Ok(PaymentFrequency::Monthly),
        "semi-monthly" | "semimonthly" => Ok(PaymentFrequency::SemiMonthly),
        "bi-weekly" | "biweekly" => Ok(PaymentFrequency::BiWeekly),
        "accelerated-bi-weekly" | "acc-bi-weekly" | "accbiweekly" => {
            Ok(PaymentFrequency::AcceleratedBiWeekly)
        }
        "weekly" => Ok(PaymentFrequency::Weekly),
        "accelerated-weekly" | "acc-weekly" | "accweekly" => {
            Ok(PaymentFrequency::AcceleratedWeekly)
        }
        other => Err(format!(
            "Unknown frequency '{}': expected monthly, semi-monthly, bi-weekly, \
             accelerated-bi-weekly, weekly, or accelerated-weekly",
            other
        )
        .into()),
    }
}

pub(crate) fn parse_compounding(
    value: &str,
) -> Result<Compounding, Box<dyn std::error::Error>> {
    match value.to_ascii_lowercase().as_str() {
        "semi-annual" | "semiannual" | "canadian" => Ok(Compounding::SemiAnnual),
        "nominal" | "simple" => Ok(Compounding::Nominal),
        other => Err(format!(
            "Unknown compounding '{}': expected semi-annual or nominal",
            other
        )
        .into()),
    }
}
