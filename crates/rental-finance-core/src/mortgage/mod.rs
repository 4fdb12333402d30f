//! Mortgage financing analytics: periodic payment, amortization schedules,
//! prepayment scenarios, refinance comparison, and break-penalty estimates.
//! All math in `rust_decimal::Decimal`.

pub mod payment;
pub mod penalty;
pub mod prepayment;
pub mod rates;
pub mod refinance;
pub mod schedule;

/// Hard ceiling on amortization loop iterations. The longest legal schedule
/// is 600 months at weekly frequency (2600 periods); anything beyond this
/// cap indicates a payment/balance combination that cannot terminate.
pub(crate) const PERIOD_CAP: u32 = 4000;
